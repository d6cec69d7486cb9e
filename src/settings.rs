//! Local payment-gateway settings owned by the host store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;

pub const ENABLED: &str = "enabled";
pub const TEST_MODE: &str = "test_mode";
pub const DEV_MODE: &str = "dev_mode";

const YES: &str = "yes";
const NO: &str = "no";

#[derive(Debug, Clone, Error)]
pub enum SettingsError {
    #[error("Settings storage error: {0}")]
    Storage(String),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

/// String key-value settings, persisted by the host application.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, key: &str) -> SettingsResult<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> SettingsResult<()>;
}

#[derive(Debug, Default)]
pub struct InMemorySettings {
    values: RwLock<HashMap<String, String>>,
}

impl InMemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: RwLock::new(
                values
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl SettingsStore for InMemorySettings {
    async fn get(&self, key: &str) -> SettingsResult<Option<String>> {
        let values = self
            .values
            .read()
            .map_err(|_| SettingsError::Storage("settings lock poisoned".to_string()))?;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> SettingsResult<()> {
        let mut values = self
            .values
            .write()
            .map_err(|_| SettingsError::Storage("settings lock poisoned".to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Typed view over the gateway's yes/no flags.
#[derive(Clone)]
pub struct GatewaySettings {
    store: Arc<dyn SettingsStore>,
}

impl GatewaySettings {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    async fn flag(&self, key: &str) -> SettingsResult<bool> {
        Ok(self.store.get(key).await?.as_deref() == Some(YES))
    }

    async fn set_flag(&self, key: &str, on: bool) -> SettingsResult<()> {
        self.store.set(key, if on { YES } else { NO }).await
    }

    pub async fn is_enabled(&self) -> SettingsResult<bool> {
        self.flag(ENABLED).await
    }

    pub async fn enable(&self) -> SettingsResult<()> {
        self.set_flag(ENABLED, true).await
    }

    pub async fn is_test_mode(&self) -> SettingsResult<bool> {
        self.flag(TEST_MODE).await
    }

    pub async fn set_test_mode(&self, on: bool) -> SettingsResult<()> {
        self.set_flag(TEST_MODE, on).await
    }

    /// Dev mode: the store is not processing real transactions, so test
    /// accounts are acceptable.
    pub async fn is_in_dev_mode(&self) -> SettingsResult<bool> {
        self.flag(DEV_MODE).await
    }

    pub async fn set_dev_mode(&self, on: bool) -> SettingsResult<()> {
        self.set_flag(DEV_MODE, on).await
    }
}
