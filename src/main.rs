mod api;
mod config;
mod database;
mod graphql;
mod jobs;
mod middleware;
mod models;
mod seeds;
mod services;
mod session;
mod state;
mod utils;

#[cfg(test)]
mod test_support;

use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;

use crate::config::Config;
use crate::database::Database;
use crate::graphql::GRAPHQL_PATH;
use crate::services::TmdbClient;
use crate::session::{MemorySessionStore, RedisSessionStore, SessionManager, SessionStore};
use crate::state::AppState;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        log::error!("❌ {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    })?;

    log::info!("🚀 Starting Movie Discovery Service ({:?})...", config.app_env);
    log::info!("📊 Database: {}", config.database_url);

    let db = Database::connect_with_retry(
        &config.database_url,
        config.database_max_connections,
        config.database_connect_retries,
        config.database_retry_delay,
    )
    .await
    .map_err(|e| io::Error::new(io::ErrorKind::ConnectionRefused, e.to_string()))?;

    // 🌱 Demo account
    if config.seed_default_user {
        seeds::default_user_seed::seed_default_user(&db, config.bcrypt_cost).await;
    }

    let store: Arc<dyn SessionStore> = match &config.redis_url {
        Some(url) => Arc::new(RedisSessionStore::connect(url).await.map_err(|e| {
            log::error!("❌ {}", e);
            io::Error::new(io::ErrorKind::ConnectionRefused, e.to_string())
        })?),
        None => {
            log::warn!("⚠️  REDIS_URL is not set, sessions are kept in process memory");
            Arc::new(MemorySessionStore::new())
        }
    };
    let sessions = SessionManager::new(store.clone(), &config);

    log::info!("📅 Starting background jobs...");
    jobs::session_sweeper::start_session_sweeper(store, config.session_sweep_interval);

    let catalog = Arc::new(TmdbClient::from_config(&config));
    log::info!("🎬 Catalog: {}", config.tmdb_api_url);

    let bind_address = config.bind_address();
    let cors_origins = config.cors_origins.clone();

    let state = AppState::new(db.clone(), sessions, catalog, config);
    let schema = graphql::build_schema(state.clone());

    let state_data = web::Data::new(state.clone());
    let schema_data = web::Data::new(schema);

    log::info!("🌐 Server starting on {}", bind_address);
    log::info!("🛝 GraphQL playground at: http://{}{}", bind_address, GRAPHQL_PATH);

    let server = HttpServer::new(move || {
        let cors = cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(state_data.clone())
            .app_data(schema_data.clone())
            .wrap(middleware::SessionMiddleware::new(state.sessions.clone()))
            .wrap(cors)
            .wrap(middleware::SecurityHeaders)
            .wrap(Logger::default())
            // Health check
            .route("/health", web::get().to(api::health::health_check))
            // GraphQL
            .route(GRAPHQL_PATH, web::post().to(api::graphql::graphql))
            .route(GRAPHQL_PATH, web::get().to(api::graphql::playground))
    })
    .bind(&bind_address)?
    .run()
    .await;

    db.close().await;
    log::info!("👋 Server stopped");

    server
}
