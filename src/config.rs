use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::utils::AppError;

pub const DEFAULT_TMDB_API_URL: &str = "https://api.themoviedb.org/3";

/// Upper bound for `SESSION_TTL_SECS` (one year).
pub const MAX_SESSION_TTL_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Production,
    Development,
    Test,
}

impl FromStr for AppEnv {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Ok(AppEnv::Production),
            "development" | "dev" => Ok(AppEnv::Development),
            "test" => Ok(AppEnv::Test),
            other => Err(AppError::ConfigError(format!("unknown APP_ENV '{}'", other))),
        }
    }
}

/// How mutations report validation and authentication failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorReporting {
    /// Raise a GraphQL error.
    Throw,
    /// Return a `[FieldError]` payload where the mutation's shape allows it.
    List,
}

impl FromStr for ErrorReporting {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "throw" => Ok(ErrorReporting::Throw),
            "list" => Ok(ErrorReporting::List),
            other => Err(AppError::ConfigError(format!(
                "unknown ERROR_REPORTING '{}' (expected 'throw' or 'list')",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub app_env: AppEnv,

    pub database_url: String,
    pub database_max_connections: u32,
    pub database_connect_retries: u32,
    pub database_retry_delay: Duration,

    pub tmdb_api_url: String,
    pub tmdb_api_key: String,

    pub error_reporting: ErrorReporting,

    /// Session store; in-process memory when unset.
    pub redis_url: Option<String>,
    pub session_cookie_name: String,
    pub session_ttl: Duration,
    pub session_sweep_interval: Duration,
    pub cookie_secure: bool,

    pub bcrypt_cost: u32,
    pub cors_origins: Vec<String>,
    pub seed_default_user: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, so tests don't have to
    /// touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let app_env = match get("APP_ENV") {
            Some(v) => v.parse()?,
            None => AppEnv::Development,
        };

        let error_reporting = match get("ERROR_REPORTING") {
            Some(v) => v.parse()?,
            None if app_env == AppEnv::Test => ErrorReporting::List,
            None => ErrorReporting::Throw,
        };

        let tmdb_api_key = get("TMDB_API_KEY").unwrap_or_default();
        if tmdb_api_key.is_empty() {
            log::warn!("⚠️  TMDB_API_KEY is not set, catalog queries will be rejected upstream");
        }

        let bcrypt_cost: u32 = parse_or(&get, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(AppError::ConfigError(format!(
                "BCRYPT_COST must be between 4 and 31, got {}",
                bcrypt_cost
            )));
        }

        let session_ttl_secs: u64 = parse_or(&get, "SESSION_TTL_SECS", 86_400)?;
        if !(1..=MAX_SESSION_TTL_SECS).contains(&session_ttl_secs) {
            return Err(AppError::ConfigError(format!(
                "SESSION_TTL_SECS must be between 1 and {}, got {}",
                MAX_SESSION_TTL_SECS, session_ttl_secs
            )));
        }

        let sweep_interval_secs: u64 = parse_or(&get, "SESSION_SWEEP_INTERVAL_SECS", 600)?;
        if sweep_interval_secs == 0 {
            return Err(AppError::ConfigError(
                "SESSION_SWEEP_INTERVAL_SECS must be greater than 0".to_string(),
            ));
        }

        let cors_origins = get("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000,http://127.0.0.1:3000".to_string())
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        Ok(Config {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&get, "PORT", 8080)?,
            app_env,

            database_url: get("DATABASE_URL").unwrap_or_else(|| "sqlite://movies.db".to_string()),
            database_max_connections: parse_or(&get, "DATABASE_MAX_CONNECTIONS", 5)?,
            database_connect_retries: parse_or(&get, "DATABASE_CONNECT_RETRIES", 5)?,
            database_retry_delay: Duration::from_secs(parse_or(
                &get,
                "DATABASE_RETRY_DELAY_SECS",
                5,
            )?),

            tmdb_api_url: get("TMDB_API_URL")
                .unwrap_or_else(|| DEFAULT_TMDB_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            tmdb_api_key,

            error_reporting,

            redis_url: get("REDIS_URL"),
            session_cookie_name: get("SESSION_COOKIE_NAME").unwrap_or_else(|| "sid".to_string()),
            session_ttl: Duration::from_secs(session_ttl_secs),
            session_sweep_interval: Duration::from_secs(sweep_interval_secs),
            cookie_secure: parse_or(&get, "COOKIE_SECURE", app_env == AppEnv::Production)?,

            bcrypt_cost,
            cors_origins,
            seed_default_user: parse_or(
                &get,
                "SEED_DEFAULT_USER",
                app_env != AppEnv::Production,
            )?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::ConfigError(format!("{}='{}': {}", key, raw, e))),
        None => Ok(default),
    }
}
