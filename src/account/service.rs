//! Account status service
//!
//! Serves the merchant's payments account from cache when the cached value
//! can be trusted and reads through to the payments API otherwise. The
//! `NoAccount` answer and the onboarding pause are cached too, so a store
//! without an account does not hit the API on every admin page load.

use crate::account::store::AccountStore;
use crate::account::{degrade, AccountResult};
use crate::admin::notice::{self, Notice};
use crate::admin::urls::UrlBuilder;
use crate::cache::{CacheEntry, Clock, SystemClock};
use crate::logging::mask_account_id;
use crate::payments::{
    AccountGateway, AccountSnapshot, AccountStatus, DepositsStatus, GatewayError,
};
use crate::settings::GatewaySettings;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Settings-page summary of a connected account.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub status: AccountStatus,
    pub payments_enabled: bool,
    pub deposits_status: DepositsStatus,
    /// Unix seconds
    pub current_deadline: Option<i64>,
    pub account_link: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum AccountStatusData {
    Account(AccountSummary),
    Error { error: bool },
}

impl AccountStatusData {
    fn error() -> Self {
        AccountStatusData::Error { error: true }
    }
}

/// Outcome of the settings-page connection check.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", content = "notice", rename_all = "snake_case")]
pub enum AccountCheck {
    Connected,
    NotConnected(Notice),
    /// The account could not be loaded; nothing is shown.
    Unavailable,
}

/// Whether a cached snapshot can be served without asking the API.
///
/// Test-mode accounts are only trusted in dev mode, so a store leaving dev
/// mode refetches instead of serving a stale test account.
pub fn is_valid_cached_account(
    entry: Option<&CacheEntry<AccountSnapshot>>,
    now: DateTime<Utc>,
    dev_mode: bool,
) -> bool {
    match entry {
        None => false,
        Some(entry) if entry.is_expired_at(now) => false,
        Some(entry) => match &entry.value {
            AccountSnapshot::NoAccount => true,
            AccountSnapshot::Connected(record) => record.is_live || dev_mode,
        },
    }
}

pub struct AccountService {
    gateway: Arc<dyn AccountGateway>,
    store: AccountStore,
    settings: GatewaySettings,
    urls: Arc<UrlBuilder>,
    clock: Arc<dyn Clock>,
}

impl AccountService {
    pub fn new(
        gateway: Arc<dyn AccountGateway>,
        store: AccountStore,
        settings: GatewaySettings,
        urls: Arc<UrlBuilder>,
    ) -> Self {
        Self {
            gateway,
            store,
            settings,
            urls,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Cached-or-fetch account status.
    ///
    /// Only gateway failures other than `NotFound` and `OnboardingDisabled`
    /// are returned as errors; those two are cached as `NoAccount`.
    pub async fn get_account_status(&self) -> AccountResult<AccountSnapshot> {
        if let Some(snapshot) = self.cached_account().await {
            debug!(connected = snapshot.is_connected(), "serving cached account status");
            return Ok(snapshot);
        }

        self.refresh_account().await
    }

    async fn cached_account(&self) -> Option<AccountSnapshot> {
        let entry = degrade("read account", self.store.account().await).flatten()?;

        let dev_mode = match &entry.value {
            AccountSnapshot::Connected(record) if !record.is_live => self.dev_mode().await,
            _ => false,
        };

        if is_valid_cached_account(Some(&entry), self.clock.now(), dev_mode) {
            Some(entry.value)
        } else {
            debug!("cached test-mode account is not trusted outside dev mode");
            None
        }
    }

    async fn refresh_account(&self) -> AccountResult<AccountSnapshot> {
        degrade(
            "clear onboarding flag",
            self.store.clear_onboarding_disabled().await,
        );

        let (snapshot, onboarding_disabled) = match self.gateway.get_account_data().await {
            Ok(record) => {
                info!(
                    account_id = %mask_account_id(&record.account_id),
                    status = %record.status,
                    is_live = record.is_live,
                    "fetched payments account"
                );
                (AccountSnapshot::Connected(record), false)
            }
            Err(GatewayError::NotFound) => {
                info!("no payments account connected to this store");
                (AccountSnapshot::NoAccount, false)
            }
            Err(GatewayError::OnboardingDisabled) => {
                info!("payments API reports new account onboarding is disabled");
                (AccountSnapshot::NoAccount, true)
            }
            Err(e) => {
                warn!(error = %e, code = e.code(), "failed to fetch payments account");
                return Err(e.into());
            }
        };

        degrade("store account", self.store.store_account(&snapshot).await);
        if onboarding_disabled {
            degrade(
                "set onboarding flag",
                self.store.set_onboarding_disabled().await,
            );
        }

        Ok(snapshot)
    }

    async fn dev_mode(&self) -> bool {
        match self.settings.is_in_dev_mode().await {
            Ok(on) => on,
            Err(e) => {
                warn!(error = %e, "could not read dev mode setting, assuming off");
                false
            }
        }
    }

    pub async fn account_id(&self) -> AccountResult<Option<String>> {
        Ok(self
            .get_account_status()
            .await?
            .record()
            .map(|record| record.account_id.clone()))
    }

    pub async fn publishable_key(&self, is_test: bool) -> AccountResult<Option<String>> {
        Ok(self
            .get_account_status()
            .await?
            .record()
            .map(|record| record.publishable_key(is_test).to_string()))
    }

    /// `false` only when the API has confirmed there is no account.
    pub async fn try_is_connected(&self) -> AccountResult<bool> {
        Ok(self.get_account_status().await?.is_connected())
    }

    /// Like `try_is_connected`, answering `on_error` when the API fails.
    pub async fn is_connected(&self, on_error: bool) -> bool {
        match self.try_is_connected().await {
            Ok(connected) => connected,
            Err(e) => {
                warn!(error = %e, "connection check failed");
                on_error
            }
        }
    }

    pub async fn is_onboarding_disabled(&self) -> bool {
        degrade(
            "read onboarding flag",
            self.store.onboarding_disabled().await,
        )
        .unwrap_or(false)
    }

    pub async fn account_status_data(&self) -> AccountStatusData {
        let snapshot = match self.get_account_status().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "account status unavailable for settings page");
                return AccountStatusData::error();
            }
        };

        match snapshot {
            AccountSnapshot::NoAccount => AccountStatusData::error(),
            AccountSnapshot::Connected(record) => AccountStatusData::Account(AccountSummary {
                status: record.status,
                payments_enabled: record.payments_enabled,
                deposits_status: record.deposits_status,
                current_deadline: record.current_deadline.map(|d| d.timestamp()),
                account_link: self.urls.login_url(),
            }),
        }
    }

    /// Settings-page check. A store without an account gets the connect
    /// prompt, or the pause message while onboarding is disabled.
    pub async fn check_account_status(&self) -> AccountCheck {
        let snapshot = match self.get_account_status().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!(error = %e, "account status check failed");
                return AccountCheck::Unavailable;
            }
        };

        if snapshot.is_connected() {
            return AccountCheck::Connected;
        }

        let notice = if self.is_onboarding_disabled().await {
            Notice::warning(notice::ONBOARDING_PAUSED)
        } else {
            Notice::success(notice::CONNECT_PROMPT)
                .with_action(notice::VERIFY_DETAILS_LABEL, self.urls.connect_url())
        };
        AccountCheck::NotConnected(notice)
    }
}
