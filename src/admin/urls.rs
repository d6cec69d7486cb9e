//! Settings-page URLs and the redirect host allow-list.

use crate::account::signals::{CONNECT, CONNECTION_SUCCESS, LOGIN, NONCE};
use crate::admin::nonce::NonceVerifier;
use crate::config::ConfigError;
use reqwest::Url;
use std::sync::Arc;
use tracing::warn;

pub struct UrlBuilder {
    settings_url: Url,
    allowed_hosts: Vec<String>,
    nonces: Arc<dyn NonceVerifier>,
}

impl UrlBuilder {
    pub fn new(
        settings_url: &str,
        allowed_hosts: Vec<String>,
        nonces: Arc<dyn NonceVerifier>,
    ) -> Result<Self, ConfigError> {
        let settings_url = Url::parse(settings_url).map_err(|e| {
            ConfigError::InvalidValue(format!("STORE_SETTINGS_URL is not a valid URL: {}", e))
        })?;
        if settings_url.host_str().is_none() {
            return Err(ConfigError::InvalidValue(
                "STORE_SETTINGS_URL must include a host".to_string(),
            ));
        }

        Ok(Self {
            settings_url,
            allowed_hosts: allowed_hosts
                .into_iter()
                .map(|h| h.trim().to_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
            nonces,
        })
    }

    pub fn settings_url(&self) -> String {
        self.settings_url.to_string()
    }

    fn settings_with(&self, params: &[(&str, &str)]) -> String {
        let mut url = self.settings_url.clone();
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }
        url.to_string()
    }

    /// Settings page carrying the `connection-success` marker.
    pub fn connection_success_url(&self) -> String {
        self.settings_with(&[(CONNECTION_SUCCESS, "1")])
    }

    /// Signed link that sends the merchant to their account dashboard.
    pub fn login_url(&self) -> String {
        let nonce = self.nonces.create(LOGIN);
        self.settings_with(&[(LOGIN, "1"), (NONCE, &nonce)])
    }

    /// Signed link that starts onboarding.
    pub fn connect_url(&self) -> String {
        let nonce = self.nonces.create(CONNECT);
        self.settings_with(&[(CONNECT, "1"), (NONCE, &nonce)])
    }

    pub fn is_allowed_host(&self, host: &str) -> bool {
        let host = host.to_lowercase();
        self.settings_url.host_str() == Some(host.as_str())
            || self.allowed_hosts.iter().any(|allowed| *allowed == host)
    }

    /// Return `target` when it points at the store or an allowed host,
    /// otherwise the settings page.
    pub fn safe_redirect(&self, target: &str) -> String {
        let allowed = Url::parse(target)
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https"))
            .and_then(|url| url.host_str().map(|h| self.is_allowed_host(h)))
            .unwrap_or(false);

        if allowed {
            target.to_string()
        } else {
            warn!(target = target, "redirect target not allowed, using settings page");
            self.settings_url()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::nonce::HmacNonce;

    fn builder() -> UrlBuilder {
        UrlBuilder::new(
            "https://shop.example/admin.php?page=payments",
            vec!["connect.stripe.com".to_string()],
            Arc::new(HmacNonce::new("test-secret-0123456789")),
        )
        .expect("valid settings url")
    }

    #[test]
    fn success_url_keeps_existing_query() {
        assert_eq!(
            builder().connection_success_url(),
            "https://shop.example/admin.php?page=payments&connection-success=1"
        );
    }

    #[test]
    fn login_and_connect_urls_carry_verifiable_nonces() {
        let nonces = HmacNonce::new("test-secret-0123456789");
        let builder = builder();

        let login = Url::parse(&builder.login_url()).unwrap();
        let pairs: Vec<(String, String)> = login.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("login".to_string(), "1".to_string())));
        let nonce = pairs.iter().find(|(k, _)| k == "_nonce").map(|(_, v)| v).unwrap();
        assert!(nonces.verify("login", nonce));

        let connect = Url::parse(&builder.connect_url()).unwrap();
        let nonce = connect
            .query_pairs()
            .find(|(k, _)| k == "_nonce")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        assert!(nonces.verify("connect", &nonce));
        assert!(!nonces.verify("login", &nonce));
    }

    #[test]
    fn safe_redirect_allows_store_and_listed_hosts() {
        let builder = builder();
        let external = "https://connect.stripe.com/oauth/authorize?state=abc";
        assert_eq!(builder.safe_redirect(external), external);

        let internal = "https://shop.example/admin.php?page=payments&connection-success=1";
        assert_eq!(builder.safe_redirect(internal), internal);
    }

    #[test]
    fn safe_redirect_falls_back_for_unknown_hosts() {
        let builder = builder();
        assert_eq!(
            builder.safe_redirect("https://evil.example/phish"),
            builder.settings_url()
        );
        assert_eq!(builder.safe_redirect("javascript:alert(1)"), builder.settings_url());
        assert_eq!(builder.safe_redirect("not a url"), builder.settings_url());
    }

    #[test]
    fn rejects_relative_settings_url() {
        let result = UrlBuilder::new(
            "/admin.php",
            vec![],
            Arc::new(HmacNonce::new("test-secret-0123456789")),
        );
        assert!(result.is_err());
    }
}
