use std::sync::{Arc, Mutex};

use crate::session::{Caller, SessionId};

/// Session change a resolver asked for; applied to the response cookies
/// once the operation has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionChange {
    Established(SessionId),
    Destroyed,
}

/// Per-request session context handed to resolvers explicitly.
#[derive(Debug, Clone)]
pub struct RequestSession {
    caller: Caller,
    change: Arc<Mutex<Option<SessionChange>>>,
}

impl RequestSession {
    pub fn new(caller: Caller) -> Self {
        Self {
            caller,
            change: Arc::new(Mutex::new(None)),
        }
    }

    pub fn caller(&self) -> &Caller {
        &self.caller
    }

    /// The last change wins (sign in, then sign out = signed out).
    pub fn record(&self, change: SessionChange) {
        let mut slot = self.change.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(change);
    }

    pub fn take_change(&self) -> Option<SessionChange> {
        self.change
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }
}
