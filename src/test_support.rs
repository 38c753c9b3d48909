//! Fixtures shared by the unit tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Config;
use crate::database::Database;
use crate::models::{
    CatalogConfiguration, Genre, ImageConfiguration, Movie, MoviePage, NewUser,
};
use crate::services::MovieCatalog;
use crate::session::{MemorySessionStore, SessionManager};
use crate::state::AppState;
use crate::utils::AppError;

/// Cheapest cost bcrypt accepts; keeps the suite fast.
pub const TEST_BCRYPT_COST: u32 = 4;

pub fn test_config() -> Config {
    let vars: HashMap<&str, &str> = [
        ("APP_ENV", "test"),
        ("BCRYPT_COST", "4"),
        ("TMDB_API_KEY", "test-key"),
        ("TMDB_API_URL", "http://127.0.0.1:9/3"),
    ]
    .into_iter()
    .collect();

    Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).expect("test config")
}

pub async fn test_database() -> Database {
    Database::in_memory().await.expect("in-memory database")
}

pub fn new_user(email: &str, username: &str, password: &str) -> NewUser {
    NewUser {
        email: email.into(),
        username: username.into(),
        password: password.into(),
    }
}

pub async fn test_state(config: Config) -> AppState {
    let sessions = SessionManager::new(Arc::new(MemorySessionStore::new()), &config);

    AppState::new(
        test_database().await,
        sessions,
        Arc::new(StubCatalog),
        config,
    )
}

/// Catalog double answering from fixed data.
pub struct StubCatalog;

pub fn matrix() -> Movie {
    Movie {
        id: 603,
        title: Some("The Matrix".into()),
        genre_ids: vec![28, 878],
        ..Default::default()
    }
}

#[async_trait]
impl MovieCatalog for StubCatalog {
    async fn search_movies(&self, query: &str) -> Result<Vec<Movie>, AppError> {
        if "the matrix".contains(&query.to_lowercase()) {
            Ok(vec![matrix()])
        } else {
            Ok(vec![])
        }
    }

    async fn movie_detail(&self, id: i64) -> Result<Movie, AppError> {
        if id == 603 {
            Ok(Movie {
                budget: Some(63_000_000),
                genres: vec![Genre { id: 28, name: "Action".into() }],
                ..matrix()
            })
        } else {
            Err(AppError::UpstreamError(format!("movie/{} returned 404 Not Found", id)))
        }
    }

    async fn genre_list(&self) -> Result<Vec<Genre>, AppError> {
        Ok(vec![
            Genre { id: 28, name: "Action".into() },
            Genre { id: 878, name: "Science Fiction".into() },
        ])
    }

    async fn trending_movies(&self) -> Result<MoviePage, AppError> {
        Ok(MoviePage {
            page: 1,
            results: vec![matrix()],
            total_pages: 1,
            total_results: 1,
        })
    }

    async fn configuration(&self) -> Result<CatalogConfiguration, AppError> {
        Ok(CatalogConfiguration {
            images: ImageConfiguration {
                secure_base_url: Some("https://image.tmdb.org/t/p/".into()),
                poster_sizes: vec!["w92".into(), "original".into()],
                ..Default::default()
            },
            change_keys: vec![],
        })
    }
}
