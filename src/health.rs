//! Health check module
//! Provides health status for the application and its cache backend

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{error, info};

use crate::cache::{Cache, CacheError};

const CACHE_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Health status response
#[derive(Debug, Serialize, Clone)]
pub struct HealthStatus {
    pub status: HealthState,
    pub checks: HashMap<String, ComponentHealth>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Overall health state
#[derive(Debug, Serialize, Clone)]
pub enum HealthState {
    Healthy,
    Unhealthy,
}

/// Individual component health status
#[derive(Debug, Serialize, Clone)]
pub struct ComponentHealth {
    pub status: ComponentState,
    pub response_time_ms: Option<u128>,
    pub details: Option<String>,
}

/// Component state
#[derive(Debug, Serialize, Clone)]
pub enum ComponentState {
    Up,
    Down,
}

impl HealthStatus {
    pub fn new() -> Self {
        Self {
            status: HealthState::Healthy,
            checks: HashMap::new(),
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self.status, HealthState::Healthy)
    }
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentHealth {
    pub fn up(response_time_ms: Option<u128>, details: Option<String>) -> Self {
        Self {
            status: ComponentState::Up,
            response_time_ms,
            details,
        }
    }

    pub fn down(details: Option<String>) -> Self {
        Self {
            status: ComponentState::Down,
            response_time_ms: None,
            details,
        }
    }
}

/// Health checker for the application
#[derive(Clone)]
pub struct HealthChecker {
    cache: Arc<dyn Cache>,
}

impl HealthChecker {
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self { cache }
    }

    pub async fn check_health(&self) -> HealthStatus {
        let mut health_status = HealthStatus::new();
        let backend = self.cache.backend();

        let cache_health = match timeout(CACHE_CHECK_TIMEOUT, check_cache_health(self.cache.as_ref())).await {
            Ok(Ok(response_time)) => {
                info!(backend = backend, "Cache health check: OK ({}ms)", response_time);
                ComponentHealth::up(Some(response_time), Some(backend.to_string()))
            }
            Ok(Err(e)) => {
                error!(backend = backend, "Cache health check failed: {}", e);
                ComponentHealth::down(Some(e.to_string()))
            }
            Err(_) => {
                error!(backend = backend, "Cache health check timed out");
                ComponentHealth::down(Some("Timeout".to_string()))
            }
        };

        if matches!(cache_health.status, ComponentState::Down) {
            health_status.status = HealthState::Unhealthy;
        }
        health_status.checks.insert("cache".to_string(), cache_health);

        health_status
    }
}

pub async fn check_cache_health(cache: &dyn Cache) -> Result<u128, CacheError> {
    let start = Instant::now();
    cache.ping().await?;
    Ok(start.elapsed().as_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheEntry, CacheResult, InMemoryCache};
    use async_trait::async_trait;
    use serde_json::Value as JsonValue;

    struct UnreachableCache;

    #[async_trait]
    impl Cache for UnreachableCache {
        async fn read(&self, _key: &str) -> CacheResult<Option<CacheEntry<JsonValue>>> {
            Err(CacheError::ConnectionError("refused".to_string()))
        }

        async fn write(&self, _key: &str, _value: JsonValue, _ttl: Duration) -> CacheResult<()> {
            Err(CacheError::ConnectionError("refused".to_string()))
        }

        async fn invalidate(&self, _key: &str) -> CacheResult<bool> {
            Err(CacheError::ConnectionError("refused".to_string()))
        }

        async fn ping(&self) -> CacheResult<()> {
            Err(CacheError::ConnectionError("refused".to_string()))
        }

        fn backend(&self) -> &'static str {
            "unreachable"
        }
    }

    #[tokio::test]
    async fn test_health_status_creation() {
        let health_status = HealthStatus::new();
        assert!(health_status.is_healthy());
        assert!(health_status.checks.is_empty());
        assert!(health_status.timestamp <= chrono::Utc::now());
    }

    #[tokio::test]
    async fn test_in_memory_cache_is_healthy() {
        let checker = HealthChecker::new(Arc::new(InMemoryCache::new()));
        let status = checker.check_health().await;

        assert!(status.is_healthy());
        let cache = &status.checks["cache"];
        assert!(matches!(cache.status, ComponentState::Up));
        assert_eq!(cache.details.as_deref(), Some("memory"));
    }

    #[tokio::test]
    async fn test_unreachable_cache_is_unhealthy() {
        let checker = HealthChecker::new(Arc::new(UnreachableCache));
        let status = checker.check_health().await;

        assert!(!status.is_healthy());
        assert!(matches!(status.checks["cache"].status, ComponentState::Down));
    }
}
