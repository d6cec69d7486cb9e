use crate::payments::error::GatewayResult;
use crate::payments::types::{AccountRecord, LoginData, MerchantInfo, OAuthRedirect};
use async_trait::async_trait;

/// Call boundary to the remote payments API for everything account related.
///
/// Implementations own their timeout and retry policy; callers treat every
/// method as a single blocking step.
#[async_trait]
pub trait AccountGateway: Send + Sync {
    /// Fetch the account attached to this store.
    ///
    /// Fails with `GatewayError::NotFound` when no account exists and with
    /// `GatewayError::OnboardingDisabled` when, additionally, new accounts
    /// cannot currently be created.
    async fn get_account_data(&self) -> GatewayResult<AccountRecord>;

    /// One-time login link to the account dashboard. `return_url` is where the
    /// dashboard sends the merchant back to.
    async fn get_login_data(&self, return_url: &str) -> GatewayResult<LoginData>;

    /// Start the OAuth handshake that creates or reconnects an account.
    async fn get_oauth_data(
        &self,
        return_url: &str,
        merchant: &MerchantInfo,
    ) -> GatewayResult<OAuthRedirect>;
}
