use crate::error::app_error::AppError;
use chrono::{DateTime, Duration, Utc};
use password_hash::rand_core::{OsRng, RngCore};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

const TOKEN_BYTES: usize = 32;

/// Identity bound to an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub user_id: i64,
    pub username: String,
}

#[derive(Debug, Clone)]
struct Session {
    user: SessionUser,
    expires_at: DateTime<Utc>,
}

impl Session {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Opens a session for `user` and returns its token.
    async fn create(&self, user: SessionUser) -> Result<String, AppError>;

    /// Expired sessions resolve to `None`.
    async fn resolve(&self, token: &str) -> Option<SessionUser>;

    /// Removing an unknown token is not an error.
    async fn destroy(&self, token: &str) -> Result<(), AppError>;

    /// Drops every expired session, returning how many were removed.
    async fn purge_expired(&self) -> usize;
}

pub type SharedSessionStore = Arc<dyn SessionStore>;

pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[derive(Debug)]
pub struct InMemorySessionStore {
    ttl: Duration,
    sessions: Mutex<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn spawn_cleanup_task(self: Arc<Self>, interval: std::time::Duration) {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let purged = self.purge_expired().await;
                if purged > 0 {
                    debug!(purged, "expired sessions removed");
                }
            }
        });
    }
}

#[async_trait::async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, user: SessionUser) -> Result<String, AppError> {
        let expires_at = Utc::now()
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::internal("Session expiry overflowed"))?;

        let mut sessions = self.sessions.lock().await;
        let mut token = generate_token();
        while sessions.contains_key(&token) {
            token = generate_token();
        }
        sessions.insert(token.clone(), Session { user, expires_at });

        Ok(token)
    }

    async fn resolve(&self, token: &str) -> Option<SessionUser> {
        let mut sessions = self.sessions.lock().await;
        match sessions.get(token) {
            Some(session) if session.is_expired(Utc::now()) => {
                sessions.remove(token);
                None
            }
            Some(session) => Some(session.user.clone()),
            None => None,
        }
    }

    async fn destroy(&self, token: &str) -> Result<(), AppError> {
        self.sessions.lock().await.remove(token);
        Ok(())
    }

    async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now));
        before - sessions.len()
    }
}
