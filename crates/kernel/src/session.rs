//! Session storage: the cookie session layer and the key/value interface the
//! form protocol works against.

use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use fred::prelude::*;
use parking_lot::Mutex;
use serde_json::Value;
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};
use tower_sessions_redis_store::RedisStore;

use crate::config::Config;
use crate::error::AppResult;

/// Key/value view of one client's session.
///
/// Concurrent requests from the same client see the same keys; there is no
/// locking across requests, so the last writer wins.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read a value, `None` if the key is absent.
    async fn get(&self, key: &str) -> AppResult<Option<Value>>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: Value) -> AppResult<()>;

    /// Remove a key. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;
}

#[async_trait]
impl SessionStore for Session {
    async fn get(&self, key: &str) -> AppResult<Option<Value>> {
        Ok(Session::get::<Value>(self, key).await?)
    }

    async fn set(&self, key: &str, value: Value) -> AppResult<()> {
        Ok(self.insert(key, value).await?)
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.remove::<Value>(key).await?;
        Ok(())
    }
}

/// In-process session store for one client.
///
/// Used where no cookie layer exists, such as tests and one-off tools.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: Mutex<HashMap<String, Value>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored key, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.values.lock().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, key: &str) -> AppResult<Option<Value>> {
        Ok(self.values.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> AppResult<()> {
        self.values.lock().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.values.lock().remove(key);
        Ok(())
    }
}

/// Parse the configured SameSite policy, defaulting to Strict.
pub fn same_site(policy: &str) -> SameSite {
    match policy {
        "lax" => SameSite::Lax,
        "none" => SameSite::None,
        _ => SameSite::Strict,
    }
}

fn expiry(config: &Config) -> Expiry {
    match config.session_expiry_hours {
        Some(hours) => Expiry::OnInactivity(Duration::hours(hours)),
        None => Expiry::OnSessionEnd,
    }
}

/// Create the session layer using Redis as the backend.
pub async fn create_redis_session_layer(
    redis_url: &str,
    config: &Config,
) -> Result<SessionManagerLayer<RedisStore<Pool>>> {
    let redis_config = fred::prelude::Config::from_url(redis_url).context("failed to parse Redis URL")?;

    let pool = Builder::from_config(redis_config)
        .build_pool(1)
        .context("failed to create Redis pool")?;

    pool.init()
        .await
        .context("failed to connect to Redis for sessions")?;

    let store = RedisStore::new(pool);

    Ok(SessionManagerLayer::new(store)
        .with_secure(config.cookie_secure)
        .with_http_only(true)
        .with_same_site(same_site(&config.cookie_same_site))
        .with_expiry(expiry(config)))
}

/// Create a session layer that keeps sessions in process memory.
pub fn create_memory_session_layer(config: &Config) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_secure(config.cookie_secure)
        .with_http_only(true)
        .with_same_site(same_site(&config.cookie_same_site))
        .with_expiry(expiry(config))
}
