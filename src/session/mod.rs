//! Cookie sessions: an opaque token in an HTTP-only cookie, mapped to a user
//! id by a server-side [`SessionStore`].

mod memory;
mod redis_store;

pub use memory::MemorySessionStore;
pub use redis_store::RedisSessionStore;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use actix_web::cookie::{time, Cookie, SameSite};
use async_trait::async_trait;
use uuid::Uuid;

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for SessionId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::try_parse(s).map(Self).map_err(|_| ())
    }
}

/// Server-side key/value store of live sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The user bound to `id`, or `None` when unknown or expired.
    async fn load(&self, id: &SessionId) -> Option<i64>;

    /// Binds `id` to `user_id`, replacing any previous binding.
    async fn save(&self, id: &SessionId, user_id: i64, ttl: Duration);

    async fn destroy(&self, id: &SessionId);

    /// Drops expired entries, returning how many were removed.
    async fn purge_expired(&self) -> usize;
}

/// Identity of the caller of one request, resolved once from the cookie.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller {
    pub session_id: Option<SessionId>,
    pub user_id: Option<i64>,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// Session store plus the cookie policy wrapped around it.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    cookie_name: String,
    ttl: Duration,
    secure: bool,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, config: &Config) -> Self {
        Self {
            store,
            cookie_name: config.session_cookie_name.clone(),
            ttl: config.session_ttl,
            secure: config.cookie_secure,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Anonymous unless the cookie names a live session.
    pub async fn resolve(&self, cookie_value: Option<&str>) -> Caller {
        let Some(session_id) = cookie_value.and_then(|v| v.parse::<SessionId>().ok()) else {
            return Caller::anonymous();
        };

        match self.store.load(&session_id).await {
            Some(user_id) => {
                log::debug!("🔑 Session resolved for user {}", user_id);
                Caller {
                    session_id: Some(session_id),
                    user_id: Some(user_id),
                }
            }
            None => Caller {
                session_id: Some(session_id),
                user_id: None,
            },
        }
    }

    /// Starts a fresh session for `user_id`.
    pub async fn establish(&self, user_id: i64) -> SessionId {
        let session_id = SessionId::new();
        self.store.save(&session_id, user_id, self.ttl).await;
        log::info!("🔐 Session established for user {}", user_id);
        session_id
    }

    pub async fn destroy(&self, session_id: &SessionId) {
        self.store.destroy(session_id).await;
        log::info!("👋 Session destroyed");
    }

    pub fn session_cookie(&self, session_id: &SessionId) -> Cookie<'static> {
        Cookie::build(self.cookie_name.clone(), session_id.to_string())
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(self.ttl.as_secs() as i64))
            .finish()
    }

    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build(self.cookie_name.clone(), "")
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .finish();
        cookie.make_removal();
        cookie
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    fn manager() -> SessionManager {
        SessionManager::new(
            Arc::new(MemorySessionStore::new()),
            &test_support::test_config(),
        )
    }

    #[test]
    fn test_session_id_roundtrips_through_string() {
        let id = SessionId::new();
        let parsed: SessionId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-session".parse::<SessionId>().is_err());
    }

    #[test]
    fn test_session_ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[tokio::test]
    async fn test_resolve_without_cookie_is_anonymous() {
        let sessions = manager();
        assert_eq!(sessions.resolve(None).await, Caller::anonymous());
        assert_eq!(sessions.resolve(Some("garbage")).await, Caller::anonymous());
    }

    #[tokio::test]
    async fn test_establish_then_resolve() {
        let sessions = manager();
        let id = sessions.establish(7).await;

        let caller = sessions.resolve(Some(&id.to_string())).await;
        assert_eq!(caller.user_id, Some(7));

        sessions.destroy(&id).await;
        let caller = sessions.resolve(Some(&id.to_string())).await;
        assert_eq!(caller.session_id, Some(id));
        assert_eq!(caller.user_id, None);
    }

    #[test]
    fn test_cookies_are_http_only() {
        let sessions = manager();
        let id = SessionId::new();

        let cookie = sessions.session_cookie(&id);
        assert_eq!(cookie.name(), "sid");
        assert_eq!(cookie.value(), id.to_string());
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));

        let removal = sessions.removal_cookie();
        assert_eq!(removal.value(), "");
        assert_eq!(removal.max_age(), Some(time::Duration::ZERO));
    }
}
