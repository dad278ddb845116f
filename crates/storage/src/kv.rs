//! Key-value store for session data
//!
//! This module provides the asynchronous, string-keyed store the session layer
//! persists into. Two implementations are provided:
//!
//! - [`SledKvStore`]: durable store backed by sled, survives process restarts
//! - [`MemoryKvStore`]: in-process map with fault injection, for tests

use async_trait::async_trait;
use sled::Db;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Key-value store error types
#[derive(Debug, Error)]
pub enum KvError {
    /// Sled database error
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    /// Stored bytes are not valid UTF-8
    #[error("Invalid UTF-8 stored under key {key}")]
    Encoding {
        /// The key whose value could not be decoded
        key: String,
    },

    /// Invalid key
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// The backing store refused the operation
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Result type for key-value operations
pub type Result<T> = std::result::Result<T, KvError>;

/// Asynchronous string-keyed storage
///
/// Removing a key that does not exist is a successful no-op. Whether
/// [`KeyValueStore::multi_remove`] is atomic depends on the implementation.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Get the value stored under `key`
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove the value stored under `key`
    async fn remove(&self, key: &str) -> Result<()>;

    /// Remove several keys as one operation
    async fn multi_remove(&self, keys: &[&str]) -> Result<()>;
}

fn check_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(KvError::InvalidKey("key must not be empty".to_string()));
    }
    Ok(())
}

/// Key-value store configuration
#[derive(Debug, Clone)]
pub struct KvConfig {
    /// Database path
    pub path: String,
    /// Cache capacity in bytes
    pub cache_capacity: u64,
    /// Enable compression
    pub use_compression: bool,
    /// Background flush interval in milliseconds (None disables the flusher)
    pub flush_every_ms: Option<u64>,
    /// Flush to disk before every write returns
    pub flush_on_write: bool,
}

impl Default for KvConfig {
    fn default() -> Self {
        Self {
            path: "auth_starter_kv.db".to_string(),
            cache_capacity: 8 * 1024 * 1024, // 8MB
            use_compression: true,
            flush_every_ms: Some(500),
            flush_on_write: true,
        }
    }
}

impl KvConfig {
    /// Create a new configuration with a custom path
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), ..Default::default() }
    }

    /// Set cache capacity in bytes
    pub fn cache_capacity(mut self, bytes: u64) -> Self {
        self.cache_capacity = bytes;
        self
    }

    /// Enable or disable compression
    pub fn use_compression(mut self, enabled: bool) -> Self {
        self.use_compression = enabled;
        self
    }

    /// Set flush interval in milliseconds
    pub fn flush_every_ms(mut self, ms: Option<u64>) -> Self {
        self.flush_every_ms = ms;
        self
    }

    /// Enable or disable flushing on every write
    pub fn flush_on_write(mut self, enabled: bool) -> Self {
        self.flush_on_write = enabled;
        self
    }
}

/// Durable key-value store backed by sled
///
/// `multi_remove` is applied as a single sled batch, so either every key is
/// removed or none is.
#[derive(Clone)]
pub struct SledKvStore {
    db: Arc<Db>,
    flush_on_write: bool,
}

impl SledKvStore {
    /// Open (or create) a store with configuration
    pub fn new(config: KvConfig) -> Result<Self> {
        let db = sled::Config::new()
            .path(&config.path)
            .cache_capacity(config.cache_capacity)
            .use_compression(config.use_compression)
            .flush_every_ms(config.flush_every_ms)
            .open()?;
        tracing::debug!("Opened key-value store at {}", config.path);

        Ok(Self {
            db: Arc::new(db),
            flush_on_write: config.flush_on_write,
        })
    }

    /// Create a temporary store that is deleted on drop (for testing)
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;

        Ok(Self {
            db: Arc::new(db),
            flush_on_write: false,
        })
    }

    /// Flush pending writes to disk
    pub async fn flush(&self) -> Result<()> {
        self.db.flush_async().await?;
        Ok(())
    }

    /// Get the number of keys in the store
    pub fn len(&self) -> usize {
        self.db.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    async fn after_write(&self) -> Result<()> {
        if self.flush_on_write {
            self.db.flush_async().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for SledKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        check_key(key)?;
        match self.db.get(key.as_bytes())? {
            Some(bytes) => String::from_utf8(bytes.to_vec())
                .map(Some)
                .map_err(|_| KvError::Encoding { key: key.to_string() }),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        check_key(key)?;
        self.db.insert(key.as_bytes(), value.as_bytes())?;
        self.after_write().await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        check_key(key)?;
        self.db.remove(key.as_bytes())?;
        self.after_write().await
    }

    async fn multi_remove(&self, keys: &[&str]) -> Result<()> {
        let mut batch = sled::Batch::default();
        for key in keys {
            check_key(key)?;
            batch.remove(key.as_bytes());
        }
        self.db.apply_batch(batch)?;
        self.after_write().await
    }
}

/// In-memory key-value store with fault injection
///
/// Unlike [`SledKvStore`], `multi_remove` removes keys one at a time in the
/// order given. A failure part-way leaves the earlier keys removed.
#[derive(Default)]
pub struct MemoryKvStore {
    entries: RwLock<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    failing_keys: RwLock<HashSet<String>>,
}

impl MemoryKvStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every read fail (or succeed again)
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every write and removal fail (or succeed again)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make writes and removals of a single key fail
    pub async fn fail_key(&self, key: impl Into<String>) {
        self.failing_keys.write().await.insert(key.into());
    }

    /// Stop failing operations on a key
    pub async fn heal_key(&self, key: &str) {
        self.failing_keys.write().await.remove(key);
    }

    /// Store a value bypassing fault injection (for seeding test data)
    pub async fn seed(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.write().await.insert(key.into(), value.into());
    }

    /// Check if a key is present, bypassing fault injection
    pub async fn contains(&self, key: &str) -> bool {
        self.entries.read().await.contains_key(key)
    }

    /// Get the number of keys in the store
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    async fn check_write(&self, key: &str) -> Result<()> {
        check_key(key)?;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(KvError::Unavailable(format!("write to {} rejected", key)));
        }
        if self.failing_keys.read().await.contains(key) {
            return Err(KvError::Unavailable(format!("key {} is failing", key)));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        check_key(key)?;
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(KvError::Unavailable(format!("read of {} rejected", key)));
        }
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check_write(key).await?;
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.check_write(key).await?;
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn multi_remove(&self, keys: &[&str]) -> Result<()> {
        for key in keys {
            self.remove(key).await?;
        }
        Ok(())
    }
}
