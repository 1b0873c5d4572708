//! Session token store.

use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

use crate::cache::TtlCache;

/// Authenticated user attached to a session.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub email: String,
    pub nome: String,
    pub perfil: Option<String>,
}

/// Opaque-token session store with a fixed TTL.
pub struct SessionStore {
    sessions: Mutex<TtlCache<String, SessionUser>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(TtlCache::new(ttl)),
        }
    }

    /// Issue a fresh token for a user.
    pub fn issue(&self, user: SessionUser) -> String {
        let token = Uuid::new_v4().simple().to_string();
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        sessions.purge_expired();
        sessions.insert(token.clone(), user);
        token
    }

    /// Resolve a token to its user, when the session is still live.
    pub fn get(&self, token: &str) -> Option<SessionUser> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&token.to_string())
            .cloned()
    }

    /// Invalidate a token. Returns whether it existed.
    pub fn revoke(&self, token: &str) -> bool {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&token.to_string())
            .is_some()
    }
}
