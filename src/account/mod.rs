//! Account connection: cached status, derived queries and the onboarding
//! handshake.

pub mod onboarding;
pub mod service;
pub mod signals;
pub mod store;

use crate::cache::{CacheError, CacheResult};
use crate::payments::GatewayError;
use crate::settings::SettingsError;
use thiserror::Error;
use tracing::warn;

pub use onboarding::{ConnectOutcome, ConnectionStateMachine, Redirect};
pub use service::{AccountCheck, AccountService, AccountStatusData, AccountSummary};
pub use signals::{ConnectMode, RequestSignals, Trigger};
pub use store::{AccountStore, OAuthSession, ACCOUNT_TTL, OAUTH_STATE_TTL, ONBOARDING_DISABLED_TTL};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

pub type AccountResult<T> = Result<T, AccountError>;

/// Cache failures never fail an account operation; they are logged and the
/// caller carries on as if the cache were empty.
pub(crate) fn degrade<T>(operation: &str, result: CacheResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(operation = operation, error = %e, "account cache operation failed, continuing without cache");
            None
        }
    }
}
