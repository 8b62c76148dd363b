//! Admin session management.
//!
//! Sessions are opaque UUID bearer tokens kept in memory with an absolute
//! expiry. Restarting the process logs every admin out.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

/// Default session lifetime (8 hours).
pub const DEFAULT_SESSION_TTL_SECS: u64 = 8 * 60 * 60;

/// Session-related errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    /// Session has expired.
    #[error("session expired")]
    SessionExpired,

    /// Session not found.
    #[error("session not found")]
    SessionNotFound,
}

/// A logged-in admin.
#[derive(Debug, Clone)]
pub struct AdminSession {
    /// Bearer token (UUID v4).
    pub token: String,
    /// Admin email.
    pub email: String,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session expires.
    pub expires_at: DateTime<Utc>,
}

impl AdminSession {
    fn new(email: &str, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            token: Uuid::new_v4().to_string(),
            email: email.to_string(),
            created_at: now,
            expires_at: now + chrono::Duration::from_std(ttl).unwrap_or_default(),
        }
    }

    /// Check if the session has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// In-memory session store.
#[derive(Debug)]
pub struct SessionManager {
    sessions: Mutex<HashMap<String, AdminSession>>,
    ttl: Duration,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_SESSION_TTL_SECS))
    }
}

impl SessionManager {
    /// Create a session store with the given lifetime.
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Session lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, AdminSession>> {
        // A panic while holding the lock cannot leave the map inconsistent.
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start a session for an admin.
    pub fn create(&self, email: &str) -> AdminSession {
        let session = AdminSession::new(email, self.ttl);
        self.lock().insert(session.token.clone(), session.clone());
        info!(email = %email, "Admin session created");
        session
    }

    /// Look up a live session.
    ///
    /// Expired sessions are removed on access.
    pub fn get(&self, token: &str) -> Result<AdminSession, SessionError> {
        let mut sessions = self.lock();
        match sessions.get(token) {
            None => Err(SessionError::SessionNotFound),
            Some(session) if session.is_expired() => {
                sessions.remove(token);
                Err(SessionError::SessionExpired)
            }
            Some(session) => Ok(session.clone()),
        }
    }

    /// End a session. Returns whether it existed.
    pub fn remove(&self, token: &str) -> bool {
        let removed = self.lock().remove(token).is_some();
        if removed {
            debug!("Admin session removed");
        }
        removed
    }

    /// Drop all expired sessions, returning how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired());
        before - sessions.len()
    }

    /// Number of stored sessions, including expired ones not yet cleaned up.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no sessions are stored.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_get() {
        let manager = SessionManager::default();
        let session = manager.create("admin@example.com");

        let found = manager.get(&session.token).unwrap();
        assert_eq!(found.email, "admin@example.com");
        assert_eq!(found.token, session.token);
        assert!(found.expires_at > found.created_at);
    }

    #[test]
    fn test_tokens_are_unique() {
        let manager = SessionManager::default();
        let a = manager.create("admin@example.com");
        let b = manager.create("admin@example.com");
        assert_ne!(a.token, b.token);
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn test_unknown_token() {
        let manager = SessionManager::default();
        assert_eq!(
            manager.get("nope").unwrap_err(),
            SessionError::SessionNotFound
        );
    }

    #[test]
    fn test_expired_session() {
        let manager = SessionManager::new(Duration::ZERO);
        let session = manager.create("admin@example.com");

        assert_eq!(
            manager.get(&session.token).unwrap_err(),
            SessionError::SessionExpired
        );
        assert!(manager.is_empty());
    }

    #[test]
    fn test_remove() {
        let manager = SessionManager::default();
        let session = manager.create("admin@example.com");

        assert!(manager.remove(&session.token));
        assert!(!manager.remove(&session.token));
        assert!(manager.get(&session.token).is_err());
    }

    #[test]
    fn test_cleanup_expired() {
        let expired = SessionManager::new(Duration::ZERO);
        expired.create("a@example.com");
        expired.create("b@example.com");
        assert_eq!(expired.cleanup_expired(), 2);
        assert!(expired.is_empty());

        let live = SessionManager::default();
        live.create("a@example.com");
        assert_eq!(live.cleanup_expired(), 0);
        assert_eq!(live.len(), 1);
    }
}
