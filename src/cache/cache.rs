//! TTL-backed key-value store used for the account snapshot, the
//! onboarding-disabled flag and pending OAuth sessions.
//!
//! Expiry is lazy: nothing runs in the background, an entry simply reads as
//! absent once its deadline has passed.

use crate::cache::error::{CacheError, CacheResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

#[cfg(feature = "cache")]
use crate::cache::RedisPool;
#[cfg(feature = "cache")]
use redis::AsyncCommands;

/// Source of "now" for expiry decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A cached value together with the instant it stops being served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub value: T,
    pub expires_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

impl CacheEntry<JsonValue> {
    /// Deserialize the raw JSON payload, keeping the expiry.
    pub fn decode<T: DeserializeOwned>(self) -> CacheResult<CacheEntry<T>> {
        Ok(CacheEntry {
            value: serde_json::from_value(self.value)?,
            expires_at: self.expires_at,
        })
    }
}

/// Persistent key-value store with per-key TTL.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Pure lookup. Expired entries read as `None`.
    async fn read(&self, key: &str) -> CacheResult<Option<CacheEntry<JsonValue>>>;

    /// Upsert; always replaces the previous expiry.
    async fn write(&self, key: &str, value: JsonValue, ttl: Duration) -> CacheResult<()>;

    /// Explicit delete. Returns whether a live entry was removed.
    async fn invalidate(&self, key: &str) -> CacheResult<bool>;

    /// Connectivity probe used by the health endpoint.
    async fn ping(&self) -> CacheResult<()> {
        Ok(())
    }

    fn backend(&self) -> &'static str;
}

fn ensure_key(key: &str) -> CacheResult<()> {
    if key.trim().is_empty() {
        return Err(CacheError::KeyError("cache key cannot be empty".to_string()));
    }
    Ok(())
}

fn ensure_ttl(ttl: Duration) -> CacheResult<chrono::Duration> {
    if ttl.is_zero() {
        return Err(CacheError::TtlError("ttl must be greater than zero".to_string()));
    }
    chrono::Duration::from_std(ttl).map_err(|e| CacheError::TtlError(e.to_string()))
}

/// Process-local store. Used when Redis is skipped and in tests.
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, CacheEntry<JsonValue>>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn lock(&self) -> CacheResult<std::sync::MutexGuard<'_, HashMap<String, CacheEntry<JsonValue>>>> {
        self.entries
            .lock()
            .map_err(|_| CacheError::OperationError("in-memory cache lock poisoned".to_string()))
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn read(&self, key: &str) -> CacheResult<Option<CacheEntry<JsonValue>>> {
        ensure_key(key)?;
        let now = self.clock.now();
        let mut entries = self.lock()?;

        match entries.get(key) {
            Some(entry) if entry.is_expired_at(now) => {
                debug!(key = key, "dropping expired cache entry");
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.clone())),
            None => Ok(None),
        }
    }

    async fn write(&self, key: &str, value: JsonValue, ttl: Duration) -> CacheResult<()> {
        ensure_key(key)?;
        let expires_at = self.clock.now() + ensure_ttl(ttl)?;
        self.lock()?
            .insert(key.to_string(), CacheEntry { value, expires_at });
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> CacheResult<bool> {
        ensure_key(key)?;
        let now = self.clock.now();
        Ok(self
            .lock()?
            .remove(key)
            .map(|entry| !entry.is_expired_at(now))
            .unwrap_or(false))
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

/// Redis-backed store. Values are JSON strings written with `SET .. EX`.
#[cfg(feature = "cache")]
#[derive(Clone)]
pub struct RedisCache {
    pool: RedisPool,
    clock: Arc<dyn Clock>,
}

#[cfg(feature = "cache")]
impl RedisCache {
    pub fn new(pool: RedisPool) -> Self {
        Self {
            pool,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn pool(&self) -> &RedisPool {
        &self.pool
    }

    pub async fn get_connection(
        &self,
    ) -> CacheResult<bb8::PooledConnection<'_, bb8_redis::RedisConnectionManager>> {
        Ok(self.pool.get().await?)
    }
}

#[cfg(feature = "cache")]
#[async_trait]
impl Cache for RedisCache {
    async fn read(&self, key: &str) -> CacheResult<Option<CacheEntry<JsonValue>>> {
        ensure_key(key)?;
        let mut conn = self.get_connection().await?;

        let (raw, pttl): (Option<String>, i64) = redis::pipe()
            .get(key)
            .pttl(key)
            .query_async(&mut *conn)
            .await?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        // PTTL: -2 key vanished between the two commands, -1 no expiry set
        let expires_at = match pttl {
            -2 => return Ok(None),
            ms if ms < 0 => DateTime::<Utc>::MAX_UTC,
            ms => self.clock.now() + chrono::Duration::milliseconds(ms),
        };

        Ok(Some(CacheEntry {
            value: serde_json::from_str(&raw)?,
            expires_at,
        }))
    }

    async fn write(&self, key: &str, value: JsonValue, ttl: Duration) -> CacheResult<()> {
        ensure_key(key)?;
        ensure_ttl(ttl)?;
        let payload = serde_json::to_string(&value)?;
        let mut conn = self.get_connection().await?;

        let _: () = conn.set_ex(key, payload, ttl.as_secs().max(1)).await?;
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> CacheResult<bool> {
        ensure_key(key)?;
        let mut conn = self.get_connection().await?;
        let removed: i64 = conn.del(key).await?;
        Ok(removed > 0)
    }

    async fn ping(&self) -> CacheResult<()> {
        crate::cache::health_check(&self.pool).await
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
