use crate::config::PaymentsApiConfig;
use crate::logging::mask_account_id;
use crate::payments::error::{GatewayError, GatewayResult};
use crate::payments::gateway::AccountGateway;
use crate::payments::types::{AccountRecord, LoginData, MerchantInfo, OAuthRedirect};
use crate::payments::utils::PaymentHttpClient;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// `url` is either the authorization URL or `false` when the store is
/// already connected.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OAuthUrl {
    Url(String),
    Flag(bool),
}

#[derive(Debug, Deserialize)]
struct OAuthInitResponse {
    url: OAuthUrl,
    #[serde(default)]
    state: Option<String>,
}

impl TryFrom<OAuthInitResponse> for OAuthRedirect {
    type Error = GatewayError;

    fn try_from(raw: OAuthInitResponse) -> Result<Self, Self::Error> {
        match raw.url {
            OAuthUrl::Flag(false) => Ok(OAuthRedirect::AlreadyConnected),
            OAuthUrl::Flag(true) => Err(GatewayError::InvalidResponse {
                message: "oauth url must be a string or false".to_string(),
            }),
            OAuthUrl::Url(url) => {
                let state = raw
                    .state
                    .filter(|s| !s.is_empty())
                    .ok_or(GatewayError::InvalidResponse {
                        message: "oauth response is missing its state".to_string(),
                    })?;
                if url.trim().is_empty() {
                    return Err(GatewayError::InvalidResponse {
                        message: "oauth url is empty".to_string(),
                    });
                }
                Ok(OAuthRedirect::Authorize { url, state })
            }
        }
    }
}

/// `AccountGateway` backed by the payments provider's HTTP API.
pub struct PaymentsApiClient {
    config: PaymentsApiConfig,
    http: PaymentHttpClient,
}

impl PaymentsApiClient {
    pub fn new(config: PaymentsApiConfig) -> GatewayResult<Self> {
        let http =
            PaymentHttpClient::new(Duration::from_secs(config.timeout_secs), config.max_retries)?;
        Ok(Self { config, http })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl AccountGateway for PaymentsApiClient {
    async fn get_account_data(&self) -> GatewayResult<AccountRecord> {
        let record: AccountRecord = self
            .http
            .request_json(
                reqwest::Method::GET,
                &self.endpoint("/accounts"),
                self.config.api_key.as_deref(),
                None,
            )
            .await?;

        debug!(
            account_id = %mask_account_id(&record.account_id),
            "account data received"
        );
        Ok(record)
    }

    async fn get_login_data(&self, return_url: &str) -> GatewayResult<LoginData> {
        let payload = serde_json::json!({ "redirect_url": return_url });
        let data: LoginData = self
            .http
            .request_json(
                reqwest::Method::POST,
                &self.endpoint("/accounts/login_links"),
                self.config.api_key.as_deref(),
                Some(&payload),
            )
            .await?;
        debug!("dashboard login link issued");
        Ok(data)
    }

    async fn get_oauth_data(
        &self,
        return_url: &str,
        merchant: &MerchantInfo,
    ) -> GatewayResult<OAuthRedirect> {
        let payload = serde_json::json!({
            "return_url": return_url,
            "business_data": merchant,
        });
        let raw: OAuthInitResponse = self
            .http
            .request_json(
                reqwest::Method::POST,
                &self.endpoint("/oauth/init"),
                self.config.api_key.as_deref(),
                Some(&payload),
            )
            .await?;
        OAuthRedirect::try_from(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(value: serde_json::Value) -> Result<OAuthRedirect, GatewayError> {
        let raw: OAuthInitResponse = serde_json::from_value(value).expect("valid envelope");
        OAuthRedirect::try_from(raw)
    }

    #[test]
    fn false_url_means_already_connected() {
        assert_eq!(
            parse(serde_json::json!({"url": false})),
            Ok(OAuthRedirect::AlreadyConnected)
        );
    }

    #[test]
    fn url_with_state_is_an_authorization() {
        assert_eq!(
            parse(serde_json::json!({
                "url": "https://connect.stripe.com/oauth/authorize?x=1",
                "state": "abc"
            })),
            Ok(OAuthRedirect::Authorize {
                url: "https://connect.stripe.com/oauth/authorize?x=1".to_string(),
                state: "abc".to_string(),
            })
        );
    }

    #[test]
    fn url_without_state_is_rejected() {
        assert!(matches!(
            parse(serde_json::json!({"url": "https://connect.stripe.com/x"})),
            Err(GatewayError::InvalidResponse { .. })
        ));
        assert!(matches!(
            parse(serde_json::json!({"url": true, "state": "abc"})),
            Err(GatewayError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let client = PaymentsApiClient::new(PaymentsApiConfig {
            base_url: "https://api.example.com/v1/".to_string(),
            api_key: None,
            timeout_secs: 5,
            max_retries: 0,
        })
        .expect("client should build");
        assert_eq!(
            client.endpoint("/accounts"),
            "https://api.example.com/v1/accounts"
        );
    }
}
