use async_graphql::{Context, Object, Result};

use super::context::RequestSession;
use super::upstream_error;
use crate::models::{CatalogConfiguration, Genre, Movie, MoviePage, User};
use crate::services::user_service;
use crate::state::AppState;

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    // ==================== ACCOUNTS ====================

    /// The signed-in caller, or null for anonymous callers
    async fn user(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let state = ctx.data::<AppState>()?;
        let session = ctx.data::<RequestSession>()?;

        user_service::current_user(&state.db, session.caller())
            .await
            .map_err(super::internal_error)
    }

    async fn users(&self, ctx: &Context<'_>) -> Result<Vec<User>> {
        let state = ctx.data::<AppState>()?;

        user_service::list_users(&state.db)
            .await
            .map_err(super::internal_error)
    }

    // ==================== CATALOG ====================

    /// Title search; an empty result is valid
    async fn movies(&self, ctx: &Context<'_>, query: String) -> Result<Vec<Movie>> {
        let state = ctx.data::<AppState>()?;
        state.catalog.search_movies(&query).await.map_err(upstream_error)
    }

    /// Movie detail with credits
    async fn movie(&self, ctx: &Context<'_>, id: i64) -> Result<Movie> {
        let state = ctx.data::<AppState>()?;
        state.catalog.movie_detail(id).await.map_err(upstream_error)
    }

    #[graphql(name = "movie_genres")]
    async fn movie_genres(&self, ctx: &Context<'_>) -> Result<Vec<Genre>> {
        let state = ctx.data::<AppState>()?;
        state.catalog.genre_list().await.map_err(upstream_error)
    }

    #[graphql(name = "trending_movies")]
    async fn trending_movies(&self, ctx: &Context<'_>) -> Result<MoviePage> {
        let state = ctx.data::<AppState>()?;
        state.catalog.trending_movies().await.map_err(upstream_error)
    }

    /// Image base URLs and sizes
    async fn config(&self, ctx: &Context<'_>) -> Result<CatalogConfiguration> {
        let state = ctx.data::<AppState>()?;
        state.catalog.configuration().await.map_err(upstream_error)
    }
}
