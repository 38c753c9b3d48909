use async_graphql::{Context, Object, Result};

use super::context::{RequestSession, SessionChange};
use super::internal_error;
use crate::config::ErrorReporting;
use crate::models::{Favorite, NewUser, User, UserChanges};
use crate::services::{favorite_service, user_service};
use crate::state::AppState;
use crate::utils::{FieldError, ServiceError};

pub struct MutationRoot;

/// Replaces whatever session the caller had with a fresh one for `user_id`.
async fn sign_in(state: &AppState, session: &RequestSession, user_id: i64) {
    if let Some(old) = &session.caller().session_id {
        state.sessions.destroy(old).await;
    }

    let session_id = state.sessions.establish(user_id).await;
    session.record(SessionChange::Established(session_id));
}

fn thrown(e: ServiceError) -> async_graphql::Error {
    match e {
        ServiceError::Invalid(errors) => errors.into(),
        ServiceError::Internal(e) => internal_error(e),
    }
}

#[Object]
impl MutationRoot {
    /// Sign-up; signs the new user in. Null on success; problems are
    /// returned as a list or raised, depending on the reporting mode.
    async fn create_user(
        &self,
        ctx: &Context<'_>,
        email: String,
        username: String,
        password: String,
    ) -> Result<Option<Vec<FieldError>>> {
        let state = ctx.data::<AppState>()?;
        let session = ctx.data::<RequestSession>()?;

        let input = NewUser {
            email,
            username,
            password,
        };

        match user_service::create_user(&state.db, &input, state.config.bcrypt_cost).await {
            Ok(user) => {
                sign_in(state, session, user.id).await;
                Ok(None)
            }
            Err(ServiceError::Invalid(errors)) => match state.config.error_reporting {
                ErrorReporting::List => Ok(Some(errors.into_inner())),
                ErrorReporting::Throw => Err(errors.into()),
            },
            Err(e) => Err(thrown(e)),
        }
    }

    async fn update_user(
        &self,
        ctx: &Context<'_>,
        id: i64,
        email: Option<String>,
        username: Option<String>,
        password: Option<String>,
    ) -> Result<bool> {
        let state = ctx.data::<AppState>()?;

        let changes = UserChanges {
            email,
            username,
            password,
        };

        user_service::update_user(&state.db, id, changes, state.config.bcrypt_cost)
            .await
            .map_err(thrown)
    }

    /// Does not sign the user out
    async fn delete_user(&self, ctx: &Context<'_>, id: i64) -> Result<bool> {
        let state = ctx.data::<AppState>()?;
        Ok(user_service::delete_user(&state.db, id).await)
    }

    async fn login_user(&self, ctx: &Context<'_>, email: String, password: String) -> Result<User> {
        let state = ctx.data::<AppState>()?;
        let session = ctx.data::<RequestSession>()?;

        let user = user_service::login_user(&state.db, &email, &password)
            .await
            .map_err(thrown)?;

        sign_in(state, session, user.id).await;
        Ok(user)
    }

    /// Always true, even without a session
    async fn logout_user(&self, ctx: &Context<'_>) -> Result<bool> {
        let state = ctx.data::<AppState>()?;
        let session = ctx.data::<RequestSession>()?;

        if let Some(session_id) = &session.caller().session_id {
            state.sessions.destroy(session_id).await;
        }
        session.record(SessionChange::Destroyed);

        Ok(true)
    }

    /// Null when the user is unknown or the store fails
    async fn append_movie(
        &self,
        ctx: &Context<'_>,
        movie_id: i64,
        user_id: i64,
    ) -> Result<Option<Favorite>> {
        let state = ctx.data::<AppState>()?;
        Ok(favorite_service::append_favorite(&state.db, movie_id, user_id).await)
    }

    /// Removes the movie from every user's favorites
    async fn dettach_movie(&self, ctx: &Context<'_>, movie_id: i64) -> Result<bool> {
        let state = ctx.data::<AppState>()?;
        Ok(favorite_service::remove_favorite(&state.db, movie_id).await)
    }
}
