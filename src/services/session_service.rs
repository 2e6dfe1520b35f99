//! Session service - Loads and persists sessions behind signed cookie tokens.
//!
//! The cookie carries an HS256 JWT whose subject is the session id. Tokens
//! that fail verification are treated as absent.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::Config;
use crate::domain::Session;
use crate::errors::AppResult;
use crate::infra::SessionStore;

/// Session token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Session id
    pub sid: String,
    pub iat: i64,
    pub exp: i64,
}

pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_seconds: u64,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, config: &Config) -> Self {
        Self {
            store,
            encoding_key: EncodingKey::from_secret(config.session_secret_bytes()),
            decoding_key: DecodingKey::from_secret(config.session_secret_bytes()),
            ttl_seconds: config.session_ttl_seconds,
        }
    }

    /// Lifetime of stored sessions and their tokens
    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Sign a token for a session id.
    pub fn sign(&self, session_id: &str) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let ttl = i64::try_from(self.ttl_seconds).unwrap_or(i64::MAX);
        let claims = SessionClaims {
            sid: session_id.to_string(),
            iat: now,
            exp: now.saturating_add(ttl),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    /// Session id carried by a token.
    pub fn verify(&self, token: &str) -> AppResult<String> {
        let data = decode::<SessionClaims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )?;
        Ok(data.claims.sid)
    }

    /// Session for the cookie token, or a fresh anonymous one when the token
    /// is missing, invalid or points at nothing stored.
    pub async fn load(&self, token: Option<&str>) -> AppResult<Session> {
        let Some(token) = token else {
            return Ok(Session::fresh());
        };

        let session_id = match self.verify(token) {
            Ok(id) => id,
            Err(e) => {
                tracing::debug!("Discarding session token: {}", e);
                return Ok(Session::fresh());
            }
        };

        Ok(match self.store.load(&session_id).await? {
            Some(data) => Session::restore(session_id, data),
            None => Session::fresh(),
        })
    }

    /// Persist a modified session and return the token to set as cookie.
    ///
    /// Returns `None` when nothing changed.
    pub async fn commit(&self, session: &Session) -> AppResult<Option<String>> {
        if !session.is_modified() {
            return Ok(None);
        }

        if let Some(retired) = session.retired_id() {
            self.store.delete(retired).await?;
        }
        self.store.save(session.id(), session.data()).await?;

        self.sign(session.id()).map(Some)
    }

    /// Check the backing store is reachable
    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_SESSION_TTL_SECONDS;
    use crate::errors::AppError;
    use crate::infra::{MemorySessionStore, MockSessionStore};
    use uuid::Uuid;

    fn config(secret: &str) -> Config {
        Config::builder(secret.repeat(32)).unwrap()
    }

    fn memory_store() -> Arc<MemorySessionStore> {
        Arc::new(MemorySessionStore::new(DEFAULT_SESSION_TTL_SECONDS))
    }

    fn manager(store: Arc<dyn SessionStore>) -> SessionManager {
        SessionManager::new(store, &config("a"))
    }

    #[tokio::test]
    async fn test_missing_token_gives_fresh_session() {
        let session = manager(memory_store()).load(None).await.unwrap();
        assert!(!session.is_modified());
        assert!(session.data().cart.is_none());
    }

    #[tokio::test]
    async fn test_commit_then_load_restores_data() {
        let sessions = manager(memory_store());
        let mut session = Session::fresh();
        let user_id = Uuid::new_v4();
        session.login(user_id);

        let token = sessions.commit(&session).await.unwrap().unwrap();
        let loaded = sessions.load(Some(&token)).await.unwrap();

        assert_eq!(loaded.id(), session.id());
        assert_eq!(loaded.user_id(), Some(user_id));
    }

    #[tokio::test]
    async fn test_unmodified_session_is_not_written() {
        let mut store = MockSessionStore::new();
        store.expect_save().never();
        let sessions = manager(Arc::new(store));

        let token = sessions.commit(&Session::fresh()).await.unwrap();
        assert!(token.is_none());
    }

    #[tokio::test]
    async fn test_cycled_session_deletes_retired_id() {
        let store = memory_store();
        let sessions = manager(store.clone());

        let mut session = Session::fresh();
        session.stash_order(1);
        let old_token = sessions.commit(&session).await.unwrap().unwrap();

        let mut session = sessions.load(Some(&old_token)).await.unwrap();
        session.login(Uuid::new_v4());
        sessions.commit(&session).await.unwrap();

        assert_eq!(store.len().await, 1);
        assert!(sessions
            .load(Some(&old_token))
            .await
            .unwrap()
            .user_id()
            .is_none());
    }

    #[tokio::test]
    async fn test_token_from_other_secret_is_ignored() {
        let store: Arc<dyn SessionStore> = memory_store();
        let ours = SessionManager::new(store.clone(), &config("a"));
        let theirs = SessionManager::new(store.clone(), &config("b"));

        let mut session = Session::fresh();
        session.login(Uuid::new_v4());
        let forged = theirs.commit(&session).await.unwrap().unwrap();

        let loaded = ours.load(Some(&forged)).await.unwrap();
        assert_ne!(loaded.id(), session.id());
        assert!(loaded.user_id().is_none());
        assert!(matches!(ours.verify(&forged), Err(AppError::SessionToken(_))));
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let mut store = MockSessionStore::new();
        store
            .expect_save()
            .returning(|_, _| Err(AppError::session("unavailable")));
        let sessions = manager(Arc::new(store));

        let mut session = Session::fresh();
        session.mark_modified();
        let result = sessions.commit(&session).await;
        assert!(matches!(result, Err(AppError::Session(_))));
    }
}
