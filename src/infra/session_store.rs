//! Server-side session storage.
//!
//! Sessions are stored as JSON keyed by session id. Redis backs deployed
//! instances; the in-process store serves development and tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use super::cache::Cache;
use crate::config::CACHE_PREFIX_SESSION;
use crate::domain::SessionData;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stored data for a session id; `None` when unknown or expired
    async fn load(&self, session_id: &str) -> AppResult<Option<SessionData>>;

    async fn save(&self, session_id: &str, data: &SessionData) -> AppResult<()>;

    async fn delete(&self, session_id: &str) -> AppResult<()>;

    /// Check the backend is reachable
    async fn ping(&self) -> AppResult<()>;
}

/// Redis-backed session store; entries expire after the configured TTL
pub struct RedisSessionStore {
    cache: Cache,
    ttl_seconds: u64,
}

impl RedisSessionStore {
    pub fn new(cache: Cache, ttl_seconds: u64) -> Self {
        Self { cache, ttl_seconds }
    }

    fn key(session_id: &str) -> String {
        format!("{}{}", CACHE_PREFIX_SESSION, session_id)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, session_id: &str) -> AppResult<Option<SessionData>> {
        self.cache.get(&Self::key(session_id)).await
    }

    async fn save(&self, session_id: &str, data: &SessionData) -> AppResult<()> {
        self.cache
            .set_with_ttl(&Self::key(session_id), data, self.ttl_seconds)
            .await
    }

    async fn delete(&self, session_id: &str) -> AppResult<()> {
        self.cache.delete(&Self::key(session_id)).await
    }

    async fn ping(&self) -> AppResult<()> {
        self.cache.ping().await
    }
}

/// Stored JSON and the instant it stops being valid
struct MemoryEntry {
    json: String,
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Process-local session store. Entries expire after the configured TTL.
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, MemoryEntry>>,
    ttl: Duration,
}

impl MemorySessionStore {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: Duration::from_secs(ttl_seconds),
        }
    }

    /// Number of stored sessions, expired ones included until purged
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, session_id: &str) -> AppResult<Option<SessionData>> {
        let now = Instant::now();
        {
            let sessions = self.sessions.read().await;
            match sessions.get(session_id) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired(now) => {
                    return serde_json::from_str(&entry.json)
                        .map(Some)
                        .map_err(|e| AppError::session(format!("Corrupt session data: {}", e)));
                }
                Some(_) => {}
            }
        }

        let mut sessions = self.sessions.write().await;
        if sessions
            .get(session_id)
            .is_some_and(|entry| entry.is_expired(now))
        {
            sessions.remove(session_id);
            tracing::debug!(session_id, "Expired session dropped");
        }
        Ok(None)
    }

    async fn save(&self, session_id: &str, data: &SessionData) -> AppResult<()> {
        let json = serde_json::to_string(data)
            .map_err(|e| AppError::session(format!("Session serialization error: {}", e)))?;
        let now = Instant::now();
        let entry = MemoryEntry {
            json,
            expires_at: now.checked_add(self.ttl),
        };

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, existing| !existing.is_expired(now));
        sessions.insert(session_id.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> AppResult<()> {
        self.sessions.write().await.remove(session_id);
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
