//! GraphQL schema: account and favorite mutations over the relational
//! store, catalog queries proxied to TMDB.

pub mod context;
pub mod mutation;
pub mod query;

pub use context::{RequestSession, SessionChange};
pub use mutation::MutationRoot;
pub use query::QueryRoot;

use async_graphql::{EmptySubscription, Schema};

use crate::state::AppState;
use crate::utils::AppError;

pub type MovieSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// POST executes operations; GET serves the playground.
pub const GRAPHQL_PATH: &str = "/api/playground";

pub fn build_schema(state: AppState) -> MovieSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(state)
        .finish()
}

/// Store/hashing failures: detail goes to the log, the client gets a
/// generic message.
pub(crate) fn internal_error(e: AppError) -> async_graphql::Error {
    log::error!("❌ {}", e);
    async_graphql::Error::new("Internal server error")
}

/// Catalog failures are relayed without interpretation.
pub(crate) fn upstream_error(e: AppError) -> async_graphql::Error {
    log::error!("❌ {}", e);
    async_graphql::Error::new(e.to_string())
}
