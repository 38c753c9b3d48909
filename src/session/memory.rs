use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{SessionId, SessionStore};

#[derive(Debug, Clone, Copy)]
struct SessionRecord {
    user_id: i64,
    expires_at: DateTime<Utc>,
}

impl SessionRecord {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// In-process session store with per-entry expiry.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, SessionRecord>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: &SessionId) -> Option<i64> {
        let now = Utc::now();

        {
            let sessions = self.sessions.read().await;
            match sessions.get(id) {
                None => return None,
                Some(record) if !record.is_expired(now) => return Some(record.user_id),
                Some(_) => {}
            }
        }

        // expired: drop it so it can't be revived
        let mut sessions = self.sessions.write().await;
        if sessions.get(id).map_or(false, |r| r.is_expired(now)) {
            sessions.remove(id);
        }
        None
    }

    async fn save(&self, id: &SessionId, user_id: i64, ttl: Duration) {
        let now = Utc::now();
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let record = SessionRecord { user_id, expires_at };

        self.sessions.write().await.insert(*id, record);
    }

    async fn destroy(&self, id: &SessionId) {
        self.sessions.write().await.remove(id);
    }

    async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, record| !record.is_expired(now));
        before - sessions.len()
    }
}
