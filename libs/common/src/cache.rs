//! Key-value stores for the persisted session snapshot
//!
//! The auth layer writes the current user profile and its tokens through the
//! [`KeyValueStore`] trait. Three backends exist: process memory, a JSON file
//! on disk, and Redis for shells that share sessions between processes.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use redis::{AsyncCommands, Client};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::{LuminConfig, SessionStoreKind};
use crate::error::LuminResult;

/// String key-value store with optional TTL
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Set a key-value pair with optional TTL in seconds
    async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> LuminResult<()>;

    /// Get a value by key; expired entries read as missing
    async fn get(&self, key: &str) -> LuminResult<Option<String>>;

    /// Delete a key; deleting a missing key is not an error
    async fn delete(&self, key: &str) -> LuminResult<()>;
}

/// Build the store selected by the configuration
pub async fn open_store(config: &LuminConfig) -> LuminResult<Arc<dyn KeyValueStore>> {
    let store: Arc<dyn KeyValueStore> = match config.session_store {
        SessionStoreKind::Memory => Arc::new(MemoryStore::new()),
        SessionStoreKind::File => Arc::new(FileStore::new(config.session_file.clone())),
        SessionStoreKind::Redis => Arc::new(RedisPool::new(&RedisConfig::from(config)).await?),
    };
    Ok(store)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

impl Entry {
    fn new(value: &str, ttl_seconds: Option<u64>) -> Self {
        Self {
            value: value.to_string(),
            expires_at: ttl_seconds.map(|ttl| Utc::now() + ChronoDuration::seconds(ttl as i64)),
        }
    }

    fn is_live(&self) -> bool {
        self.expires_at.is_none_or(|at| at > Utc::now())
    }
}

/// Store kept in process memory; lost on exit
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> LuminResult<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(key.to_string(), Entry::new(value, ttl_seconds));
        Ok(())
    }

    async fn get(&self, key: &str) -> LuminResult<Option<String>> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.is_live() => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> LuminResult<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

/// Store persisted as a single JSON document on disk
///
/// Every write rewrites the whole file; the snapshot is a handful of keys.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    async fn read_all(&self) -> LuminResult<HashMap<String, Entry>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_all(&self, entries: &HashMap<String, Entry>) -> LuminResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let bytes = serde_json::to_vec_pretty(entries)?;
        tokio::fs::write(&self.path, bytes).await?;
        debug!("Session file written: {}", self.path.display());
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> LuminResult<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_all().await?;
        entries.insert(key.to_string(), Entry::new(value, ttl_seconds));
        self.write_all(&entries).await
    }

    async fn get(&self, key: &str) -> LuminResult<Option<String>> {
        let _guard = self.lock.lock().await;
        let entries = self.read_all().await?;
        Ok(entries
            .get(key)
            .filter(|entry| entry.is_live())
            .map(|entry| entry.value.clone()))
    }

    async fn delete(&self, key: &str) -> LuminResult<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_all().await?;
        if entries.remove(key).is_some() {
            self.write_all(&entries).await?;
        }
        Ok(())
    }
}

/// Configuration for Redis connection
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379")
    pub url: String,
}

impl From<&LuminConfig> for RedisConfig {
    fn from(config: &LuminConfig) -> Self {
        Self {
            url: config.redis_url.clone(),
        }
    }
}

/// Redis-backed store
#[derive(Clone)]
pub struct RedisPool {
    client: Client,
}

impl RedisPool {
    /// Initialize a new Redis client
    pub async fn new(config: &RedisConfig) -> LuminResult<Self> {
        let client = Client::open(config.url.clone())?;
        info!("Redis client initialized with URL: {}", config.url);
        Ok(RedisPool { client })
    }

    async fn get_connection(&self) -> LuminResult<redis::aio::MultiplexedConnection> {
        let conn = self.client.get_multiplexed_async_connection().await?;
        Ok(conn)
    }

    /// Check if Redis is reachable
    pub async fn health_check(&self) -> LuminResult<bool> {
        let mut conn = self.get_connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(pong == "PONG")
    }
}

#[async_trait]
impl KeyValueStore for RedisPool {
    async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> LuminResult<()> {
        let mut conn = self.get_connection().await?;

        if let Some(ttl) = ttl_seconds {
            let _: () = conn.set_ex(key, value, ttl).await?;
        } else {
            let _: () = conn.set(key, value).await?;
        }

        Ok(())
    }

    async fn get(&self, key: &str) -> LuminResult<Option<String>> {
        let mut conn = self.get_connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn delete(&self, key: &str) -> LuminResult<()> {
        let mut conn = self.get_connection().await?;
        let _: u64 = conn.del(key).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_set_get_delete() -> LuminResult<()> {
        let store = MemoryStore::new();

        store.set("lumin:access_token", "token", None).await?;
        assert_eq!(
            store.get("lumin:access_token").await?,
            Some("token".to_string())
        );

        store.delete("lumin:access_token").await?;
        assert_eq!(store.get("lumin:access_token").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_memory_entry_with_zero_ttl_expires() -> LuminResult<()> {
        let store = MemoryStore::new();
        store.set("short", "lived", Some(0)).await?;
        assert_eq!(store.get("short").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_file_store_survives_reopen() -> LuminResult<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("session.json");

        FileStore::new(path.clone())
            .set("lumin:current_user", "{\"id\":1}", None)
            .await?;

        let reopened = FileStore::new(path);
        assert_eq!(
            reopened.get("lumin:current_user").await?,
            Some("{\"id\":1}".to_string())
        );
        reopened.delete("lumin:current_user").await?;
        assert_eq!(reopened.get("lumin:current_user").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_file_store_missing_file_reads_empty() -> LuminResult<()> {
        let dir = tempfile::tempdir()?;
        let store = FileStore::new(dir.path().join("absent.json"));
        assert_eq!(store.get("anything").await?, None);
        store.delete("anything").await?;
        Ok(())
    }
}
