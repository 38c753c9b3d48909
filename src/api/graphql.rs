use actix_web::{web, HttpResponse, Responder};
use async_graphql::http::{playground_source, GraphQLPlaygroundConfig};
use async_graphql_actix_web::GraphQLRequest;

use crate::graphql::{MovieSchema, RequestSession, SessionChange, GRAPHQL_PATH};
use crate::session::Caller;
use crate::state::AppState;

/// Executes one GraphQL operation and turns the session change it asked
/// for into a Set-Cookie header.
pub async fn graphql(
    schema: web::Data<MovieSchema>,
    state: web::Data<AppState>,
    caller: Option<web::ReqData<Caller>>,
    request: GraphQLRequest,
) -> HttpResponse {
    let caller = caller.map(|c| c.into_inner()).unwrap_or_default();
    let session = RequestSession::new(caller);

    let response = schema
        .execute(request.into_inner().data(session.clone()))
        .await;

    let mut builder = HttpResponse::Ok();
    match session.take_change() {
        Some(SessionChange::Established(session_id)) => {
            builder.cookie(state.sessions.session_cookie(&session_id));
        }
        Some(SessionChange::Destroyed) => {
            builder.cookie(state.sessions.removal_cookie());
        }
        None => {}
    }

    builder.json(response)
}

pub async fn playground() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(playground_source(GraphQLPlaygroundConfig::new(GRAPHQL_PATH)))
}
