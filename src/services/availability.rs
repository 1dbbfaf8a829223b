//! Availability store implementations.
//!
//! The store remembers which providers are temporarily unavailable. It is a
//! plain key/value capability with per-key expiry: a present key means
//! "unavailable until the TTL runs out", an absent key means "available".
//!
//! The store is injected into the registry as a trait object, so the
//! production Redis store and the in-memory store used by tests (and by
//! single-instance deployments without Redis) are interchangeable.

use crate::core::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use redis::AsyncCommands;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Key/value capability with per-key expiry.
///
/// Every call performs I/O (or its in-memory equivalent); there is no
/// in-process caching, so an invalidation written by one request is visible
/// to the next selection immediately.
#[async_trait]
pub trait AvailabilityStore: Send + Sync {
    /// Whether the key is currently present (set and not yet expired).
    async fn get(&self, key: &str) -> Result<bool>;

    /// Set the key with an expiry window. Re-setting an existing key resets
    /// the window.
    async fn set(&self, key: &str, ttl: Duration) -> Result<()>;
}

/// Redis-backed availability store.
///
/// Uses a multiplexed connection manager, so the store handle is cheap to
/// clone and safe to share across request tasks.
#[derive(Clone)]
pub struct RedisStore {
    conn: redis::aio::ConnectionManager,
}

impl RedisStore {
    /// Connect to Redis at the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_connection_manager().await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl AvailabilityStore for RedisStore {
    async fn get(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value.is_some())
    }

    async fn set(&self, key: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, "1", ttl.as_secs()).await?;
        Ok(())
    }
}

/// In-process availability store.
///
/// Holds expiry deadlines in a concurrent map; expired entries are dropped
/// lazily on read. Used by tests and as the fallback when no `REDIS_URL` is
/// configured.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, Instant>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AvailabilityStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<bool> {
        // Copy the deadline out before touching the map again: removing while
        // a reference is held would deadlock the shard.
        let deadline = self.entries.get(key).map(|entry| *entry.value());

        match deadline {
            Some(deadline) if Instant::now() < deadline => Ok(true),
            Some(_) => {
                self.entries.remove(key);
                Ok(false)
            }
            None => Ok(false),
        }
    }

    async fn set(&self, key: &str, ttl: Duration) -> Result<()> {
        self.entries.insert(key.to_string(), Instant::now() + ttl);
        Ok(())
    }
}
