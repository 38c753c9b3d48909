use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisResult};

use super::{SessionId, SessionStore};
use crate::utils::AppError;

const KEY_PREFIX: &str = "sess:";

/// Sessions kept in Redis, shared by every instance and surviving restarts.
/// Expiry is handled by Redis key TTLs.
#[derive(Clone)]
pub struct RedisSessionStore {
    connection: ConnectionManager,
}

impl RedisSessionStore {
    pub async fn connect(redis_url: &str) -> Result<Self, AppError> {
        let client = Client::open(redis_url)?;
        let connection = client.get_connection_manager().await?;

        log::info!("✅ Connected to session store");
        Ok(Self { connection })
    }

    fn key(id: &SessionId) -> String {
        format!("{}{}", KEY_PREFIX, id)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, id: &SessionId) -> Option<i64> {
        let mut conn = self.connection.clone();
        let user_id: RedisResult<Option<i64>> = conn.get(Self::key(id)).await;

        user_id.unwrap_or_else(|e| {
            log::error!("❌ Session lookup failed: {}", e);
            None
        })
    }

    async fn save(&self, id: &SessionId, user_id: i64, ttl: Duration) {
        let mut conn = self.connection.clone();
        let result: RedisResult<()> = conn
            .set_ex(Self::key(id), user_id, ttl.as_secs().max(1))
            .await;

        if let Err(e) = result {
            log::error!("❌ Failed to save session for user {}: {}", user_id, e);
        }
    }

    async fn destroy(&self, id: &SessionId) {
        let mut conn = self.connection.clone();
        let result: RedisResult<()> = conn.del(Self::key(id)).await;

        if let Err(e) = result {
            log::error!("❌ Failed to destroy session: {}", e);
        }
    }

    /// Redis drops expired keys on its own.
    async fn purge_expired(&self) -> usize {
        0
    }
}
