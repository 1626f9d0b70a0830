//! Session management
//!
//! Sessions map an opaque cookie token to an authenticated account. They have
//! no expiry: a session lives until logout, revocation or, for the in-memory
//! store, until the process restarts.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use common::cache::RedisPool;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::models::{Account, Session};

/// Errors raised by a session backend
#[derive(Error, Debug)]
pub enum SessionError {
    /// The shared cache failed
    #[error("Session cache error: {0}")]
    Cache(String),

    /// A stored session could not be decoded
    #[error("Session encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Storage for sessions
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, session: &Session) -> Result<(), SessionError>;

    async fn get(&self, token: &str) -> Result<Option<Session>, SessionError>;

    /// Remove one session; returns whether it existed
    async fn remove(&self, token: &str) -> Result<bool, SessionError>;

    /// Remove every session of an account; returns how many were removed
    async fn remove_for_account(&self, account_id: i64) -> Result<u64, SessionError>;
}

/// Process-held sessions, lost on restart
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, session: &Session) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.token.clone(), session.clone());
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<Session>, SessionError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(token).cloned())
    }

    async fn remove(&self, token: &str) -> Result<bool, SessionError> {
        let mut sessions = self.sessions.write().await;
        Ok(sessions.remove(token).is_some())
    }

    async fn remove_for_account(&self, account_id: i64) -> Result<u64, SessionError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.account_id != account_id);
        Ok((before - sessions.len()) as u64)
    }
}

/// Sessions shared through Redis.
///
/// Layout: `session:<token>` holds the JSON session, `account_sessions:<id>`
/// is the set of that account's tokens. Keys carry no TTL.
#[derive(Clone)]
pub struct RedisSessionStore {
    redis_pool: RedisPool,
}

impl RedisSessionStore {
    pub fn new(redis_pool: RedisPool) -> Self {
        Self { redis_pool }
    }

    fn session_key(token: &str) -> String {
        format!("session:{}", token)
    }

    fn account_key(account_id: i64) -> String {
        format!("account_sessions:{}", account_id)
    }
}

fn cache_error(error: anyhow::Error) -> SessionError {
    SessionError::Cache(error.to_string())
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn insert(&self, session: &Session) -> Result<(), SessionError> {
        let value = serde_json::to_string(session)?;
        self.redis_pool
            .set(&Self::session_key(&session.token), &value, None)
            .await
            .map_err(cache_error)?;
        self.redis_pool
            .add_to_set(&Self::account_key(session.account_id), &session.token)
            .await
            .map_err(cache_error)?;
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<Session>, SessionError> {
        let value = self
            .redis_pool
            .get(&Self::session_key(token))
            .await
            .map_err(cache_error)?;

        match value {
            Some(value) => Ok(Some(serde_json::from_str(&value)?)),
            None => Ok(None),
        }
    }

    async fn remove(&self, token: &str) -> Result<bool, SessionError> {
        let Some(session) = self.get(token).await? else {
            return Ok(false);
        };

        self.redis_pool
            .remove_from_set(&Self::account_key(session.account_id), token)
            .await
            .map_err(cache_error)?;
        self.redis_pool
            .delete(&Self::session_key(token))
            .await
            .map_err(cache_error)
    }

    async fn remove_for_account(&self, account_id: i64) -> Result<u64, SessionError> {
        let account_key = Self::account_key(account_id);
        let tokens = self
            .redis_pool
            .set_members(&account_key)
            .await
            .map_err(cache_error)?;

        let mut removed = 0;
        for token in &tokens {
            if self
                .redis_pool
                .delete(&Self::session_key(token))
                .await
                .map_err(cache_error)?
            {
                removed += 1;
            }
        }
        self.redis_pool
            .delete(&account_key)
            .await
            .map_err(cache_error)?;

        Ok(removed)
    }
}

/// Session manager for creating, resolving and revoking login sessions
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
}

impl SessionManager {
    /// Create a new session manager over the given backend
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Session manager over a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::new()))
    }

    /// Start a session for an account whose credentials were verified
    pub async fn create(&self, account: &Account) -> Result<Session, SessionError> {
        let session = Session {
            token: Uuid::new_v4().simple().to_string(),
            account_id: account.id,
            username: account.username.clone(),
            role: account.role,
            created_at: Utc::now(),
        };
        self.store.insert(&session).await?;

        info!("Created session for account: {}", account.id);
        Ok(session)
    }

    /// Session for a cookie token, if it is still live
    pub async fn resolve(&self, token: &str) -> Result<Option<Session>, SessionError> {
        self.store.get(token).await
    }

    /// End a single session (logout)
    pub async fn destroy(&self, token: &str) -> Result<bool, SessionError> {
        self.store.remove(token).await
    }

    /// End every session of an account
    pub async fn revoke_account(&self, account_id: i64) -> Result<u64, SessionError> {
        let removed = self.store.remove_for_account(account_id).await?;
        if removed > 0 {
            info!("Revoked {} session(s) for account: {}", removed, account_id);
        }
        Ok(removed)
    }
}
