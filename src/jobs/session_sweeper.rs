// ==================== SESSION SWEEPER ====================
// Periodically drops expired sessions from the store so it does not grow
// with abandoned logins.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::session::SessionStore;

/// Spawns the sweeper; it runs until the runtime shuts down.
pub fn start_session_sweeper(store: Arc<dyn SessionStore>, every: Duration) -> JoinHandle<()> {
    // tokio's interval rejects a zero period
    let every = if every.is_zero() {
        Duration::from_secs(1)
    } else {
        every
    };
    log::info!("🧹 Starting session sweeper (every {}s)", every.as_secs());

    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // first tick fires immediately; nothing can have expired yet
        ticker.tick().await;

        loop {
            ticker.tick().await;
            sweep(store.as_ref()).await;
        }
    })
}

async fn sweep(store: &dyn SessionStore) -> usize {
    let removed = store.purge_expired().await;
    if removed > 0 {
        log::info!("🧹 Removed {} expired sessions", removed);
    } else {
        log::debug!("🧹 No expired sessions");
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MemorySessionStore, SessionId};

    #[tokio::test]
    async fn test_sweep_removes_only_expired() {
        let store = MemorySessionStore::new();
        store.save(&SessionId::new(), 1, Duration::ZERO).await;
        store.save(&SessionId::new(), 2, Duration::from_secs(3600)).await;

        assert_eq!(sweep(&store).await, 1);
        assert_eq!(store.len().await, 1);
        assert_eq!(sweep(&store).await, 0);
    }

    #[tokio::test]
    async fn test_zero_interval_does_not_kill_the_sweeper() {
        let store = Arc::new(MemorySessionStore::new());
        let handle = start_session_sweeper(store, Duration::ZERO);
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(!handle.is_finished());
        handle.abort();
    }

    #[tokio::test]
    async fn test_sweeper_runs_in_background() {
        let store = Arc::new(MemorySessionStore::new());
        store.save(&SessionId::new(), 1, Duration::ZERO).await;

        let handle = start_session_sweeper(store.clone(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.abort();

        assert_eq!(store.len().await, 0);
    }
}
