//! Caching layer for account connection state
//!
//! This module provides the TTL store behind the account snapshot cache:
//! - A `Cache` trait with lazy expiry and explicit invalidation
//! - An in-memory implementation for tests and `SKIP_EXTERNALS` runs
//! - A Redis implementation that degrades gracefully when Redis is unavailable

pub mod cache;
pub mod error;
pub mod keys;

pub use cache::{Cache, CacheEntry, Clock, InMemoryCache, SystemClock};
pub use error::{CacheError, CacheResult};

#[cfg(feature = "cache")]
pub use cache::RedisCache;

#[cfg(feature = "cache")]
use bb8::Pool;
#[cfg(feature = "cache")]
use bb8_redis::RedisConnectionManager;
#[cfg(feature = "cache")]
use std::time::Duration;
#[cfg(feature = "cache")]
use tracing::{error, info, warn};

/// Redis connection pool type alias
#[cfg(feature = "cache")]
pub type RedisPool = Pool<RedisConnectionManager>;

/// Redis cache configuration
#[cfg(feature = "cache")]
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Redis connection URL
    pub redis_url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum idle connections
    pub min_idle: u32,
    /// Connection timeout
    pub connection_timeout: Duration,
    /// Maximum lifetime of a connection
    pub max_lifetime: Duration,
    /// Idle timeout before closing connection
    pub idle_timeout: Duration,
}

#[cfg(feature = "cache")]
impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            max_connections: 10,
            min_idle: 1,
            connection_timeout: Duration::from_secs(5),
            max_lifetime: Duration::from_secs(300),
            idle_timeout: Duration::from_secs(60),
        }
    }
}

/// Initialize Redis connection pool with fault tolerance
#[cfg(feature = "cache")]
pub async fn init_cache_pool(config: CacheConfig) -> Result<RedisPool, CacheError> {
    info!(
        "Initializing Redis cache pool: max_connections={}, redis_url={}",
        config.max_connections, config.redis_url
    );

    let manager = RedisConnectionManager::new(config.redis_url.clone()).map_err(|e| {
        error!("Failed to create Redis connection manager: {}", e);
        CacheError::ConnectionError(e.to_string())
    })?;

    let pool = Pool::builder()
        .max_size(config.max_connections)
        .min_idle(config.min_idle)
        .connection_timeout(config.connection_timeout)
        .max_lifetime(config.max_lifetime)
        .idle_timeout(config.idle_timeout)
        .test_on_check_out(false)
        .build(manager)
        .await
        .map_err(|e| {
            error!("Failed to build Redis connection pool: {}", e);
            CacheError::ConnectionError(e.to_string())
        })?;

    // Don't fail here - account reads fall back to the gateway
    if let Err(e) = health_check(&pool).await {
        warn!("Initial Redis connection test failed, but continuing: {}", e);
    }

    info!("Redis cache pool initialized successfully");
    Ok(pool)
}

/// Health check for Redis connection pool
#[cfg(feature = "cache")]
pub async fn health_check(pool: &RedisPool) -> Result<(), CacheError> {
    let mut conn = pool.get().await.map_err(|e| {
        error!("Failed to get Redis connection for test: {}", e);
        CacheError::ConnectionError(e.to_string())
    })?;

    let _: String = redis::cmd("PING")
        .query_async(&mut *conn)
        .await
        .map_err(|e| {
            error!("Redis PING failed: {}", e);
            CacheError::ConnectionError(e.to_string())
        })?;

    Ok(())
}

/// Pool occupancy, reported by the health endpoint
#[cfg(feature = "cache")]
#[derive(Debug, Clone, serde::Serialize)]
pub struct CacheStats {
    pub connections: u32,
    pub idle_connections: u32,
    pub connections_in_use: u32,
}

#[cfg(feature = "cache")]
pub fn get_cache_stats(pool: &RedisPool) -> CacheStats {
    let state = pool.state();
    let connections = state.connections as u32;
    let idle_connections = state.idle_connections as u32;
    CacheStats {
        connections,
        idle_connections,
        connections_in_use: connections.saturating_sub(idle_connections),
    }
}
