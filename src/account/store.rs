//! Typed access to the three account cache entries.

use crate::cache::keys::account::AccountKey;
use crate::cache::{Cache, CacheEntry, CacheResult};
use crate::payments::AccountSnapshot;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

pub const ACCOUNT_TTL: Duration = Duration::from_secs(2 * 60 * 60);
/// Outlives the account entry by an hour so the flag survives one refresh.
pub const ONBOARDING_DISABLED_TTL: Duration = Duration::from_secs(ACCOUNT_TTL.as_secs() + 60 * 60);
pub const OAUTH_STATE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Pending OAuth handshake, keyed by the state the API handed out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OAuthSession {
    pub expected_state: String,
}

#[derive(Clone)]
pub struct AccountStore {
    cache: Arc<dyn Cache>,
}

impl AccountStore {
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<dyn Cache> {
        &self.cache
    }

    pub async fn account(&self) -> CacheResult<Option<CacheEntry<AccountSnapshot>>> {
        match self.cache.read(&AccountKey::Data.to_string()).await? {
            Some(entry) => Ok(Some(entry.decode()?)),
            None => Ok(None),
        }
    }

    pub async fn store_account(&self, snapshot: &AccountSnapshot) -> CacheResult<()> {
        self.cache
            .write(
                &AccountKey::Data.to_string(),
                serde_json::to_value(snapshot)?,
                ACCOUNT_TTL,
            )
            .await
    }

    pub async fn invalidate_account(&self) -> CacheResult<bool> {
        self.cache.invalidate(&AccountKey::Data.to_string()).await
    }

    /// True only while the flag is present and set.
    pub async fn onboarding_disabled(&self) -> CacheResult<bool> {
        let entry = self
            .cache
            .read(&AccountKey::OnboardingDisabled.to_string())
            .await?;
        Ok(entry.map(|e| e.value.as_bool() == Some(true)).unwrap_or(false))
    }

    pub async fn set_onboarding_disabled(&self) -> CacheResult<()> {
        self.cache
            .write(
                &AccountKey::OnboardingDisabled.to_string(),
                serde_json::Value::Bool(true),
                ONBOARDING_DISABLED_TTL,
            )
            .await
    }

    pub async fn clear_onboarding_disabled(&self) -> CacheResult<bool> {
        self.cache
            .invalidate(&AccountKey::OnboardingDisabled.to_string())
            .await
    }

    pub async fn oauth_session(&self) -> CacheResult<Option<OAuthSession>> {
        match self.cache.read(&AccountKey::OAuthState.to_string()).await? {
            Some(entry) => Ok(Some(entry.decode::<OAuthSession>()?.value)),
            None => Ok(None),
        }
    }

    pub async fn store_oauth_session(&self, session: &OAuthSession) -> CacheResult<()> {
        self.cache
            .write(
                &AccountKey::OAuthState.to_string(),
                serde_json::to_value(session)?,
                OAUTH_STATE_TTL,
            )
            .await
    }

    pub async fn clear_oauth_session(&self) -> CacheResult<bool> {
        self.cache.invalidate(&AccountKey::OAuthState.to_string()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::cache::tests::ManualClock;
    use crate::cache::InMemoryCache;
    use chrono::Utc;

    fn store() -> (AccountStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache = Arc::new(InMemoryCache::with_clock(clock.clone()));
        (AccountStore::new(cache), clock)
    }

    #[test]
    fn flag_ttl_is_one_hour_longer_than_account_ttl() {
        assert_eq!(ONBOARDING_DISABLED_TTL - ACCOUNT_TTL, Duration::from_secs(3600));
        assert_eq!(OAUTH_STATE_TTL, Duration::from_secs(86_400));
    }

    #[tokio::test]
    async fn no_account_round_trips_as_distinct_value() {
        let (store, _) = store();
        assert!(store.account().await.unwrap().is_none());

        store.store_account(&AccountSnapshot::NoAccount).await.unwrap();
        let entry = store.account().await.unwrap().expect("entry should exist");
        assert_eq!(entry.value, AccountSnapshot::NoAccount);
    }

    #[tokio::test]
    async fn flag_outlives_account_entry() {
        let (store, clock) = store();
        store.store_account(&AccountSnapshot::NoAccount).await.unwrap();
        store.set_onboarding_disabled().await.unwrap();

        clock.advance(ACCOUNT_TTL + Duration::from_secs(60));
        assert!(store.account().await.unwrap().is_none());
        assert!(store.onboarding_disabled().await.unwrap());

        clock.advance(Duration::from_secs(3600));
        assert!(!store.onboarding_disabled().await.unwrap());
    }

    #[tokio::test]
    async fn oauth_session_lifecycle() {
        let (store, _) = store();
        let session = OAuthSession {
            expected_state: "abc".to_string(),
        };
        store.store_oauth_session(&session).await.unwrap();
        assert_eq!(store.oauth_session().await.unwrap(), Some(session));

        assert!(store.clear_oauth_session().await.unwrap());
        assert_eq!(store.oauth_session().await.unwrap(), None);
    }
}
