use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::Config;
use crate::models::{CatalogConfiguration, Genre, GenreList, Movie, MoviePage};
use crate::utils::AppError;

/// Read-only movie catalog the API proxies to.
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    async fn search_movies(&self, query: &str) -> Result<Vec<Movie>, AppError>;

    async fn movie_detail(&self, id: i64) -> Result<Movie, AppError>;

    async fn genre_list(&self) -> Result<Vec<Genre>, AppError>;

    async fn trending_movies(&self) -> Result<MoviePage, AppError>;

    async fn configuration(&self) -> Result<CatalogConfiguration, AppError>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Movie>,
}

/// TMDB v3 client. One GET per call, API key as a query parameter, no
/// retry and no caching.
#[derive(Clone)]
pub struct TmdbClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.tmdb_api_url.clone(), config.tmdb_api_key.clone())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, AppError> {
        let url = self.endpoint(path);
        log::debug!("🎬 GET {}", url);

        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| AppError::UpstreamError(format!("Failed to fetch {}: {}", path, e)))?;

        if !response.status().is_success() {
            log::error!("❌ Catalog API error on {}: {}", path, response.status());
            return Err(AppError::UpstreamError(format!(
                "{} returned {}",
                path,
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::UpstreamError(format!("Failed to parse {}: {}", path, e)))
    }
}

#[async_trait]
impl MovieCatalog for TmdbClient {
    async fn search_movies(&self, query: &str) -> Result<Vec<Movie>, AppError> {
        log::info!("🔍 Searching catalog for '{}'", query);

        let response: SearchResponse = self
            .get(
                "search/movie",
                &[("query", query), ("include_adult", "false")],
            )
            .await?;

        log::info!("✅ Found {} movies for '{}'", response.results.len(), query);
        Ok(response.results)
    }

    async fn movie_detail(&self, id: i64) -> Result<Movie, AppError> {
        log::info!("🎬 Fetching movie {}", id);

        self.get(
            &format!("movie/{}", id),
            &[("append_to_response", "credits")],
        )
        .await
    }

    async fn genre_list(&self) -> Result<Vec<Genre>, AppError> {
        let list: GenreList = self.get("genre/movie/list", &[]).await?;
        Ok(list.genres)
    }

    async fn trending_movies(&self) -> Result<MoviePage, AppError> {
        self.get("movie/popular", &[]).await
    }

    async fn configuration(&self) -> Result<CatalogConfiguration, AppError> {
        self.get("configuration", &[]).await
    }
}
