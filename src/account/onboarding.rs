//! Redirect handshake that connects a store to a payments account.
//!
//! Each admin request is inspected once and produces a single outcome: a
//! redirect for the HTTP layer to issue, a notice to show, or nothing.

use crate::account::signals::{ConnectMode, RequestSignals, Trigger, CONNECT, LOGIN};
use crate::account::store::{AccountStore, OAuthSession};
use crate::account::{degrade, AccountResult};
use crate::admin::nonce::NonceVerifier;
use crate::admin::notice::{self, Notice};
use crate::admin::urls::UrlBuilder;
use crate::logging::mask_email;
use crate::payments::utils::secure_eq;
use crate::payments::{AccountGateway, MerchantInfo, OAuthRedirect};
use crate::settings::GatewaySettings;
use std::sync::Arc;
use tracing::{error, info, warn};

/// A browser redirect. `location` has already passed the host allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    Redirect(Redirect),
    Notice(Notice),
    PassThrough,
}

pub struct ConnectionStateMachine {
    gateway: Arc<dyn AccountGateway>,
    store: AccountStore,
    settings: GatewaySettings,
    urls: Arc<UrlBuilder>,
    nonces: Arc<dyn NonceVerifier>,
}

impl ConnectionStateMachine {
    pub fn new(
        gateway: Arc<dyn AccountGateway>,
        store: AccountStore,
        settings: GatewaySettings,
        urls: Arc<UrlBuilder>,
        nonces: Arc<dyn NonceVerifier>,
    ) -> Self {
        Self {
            gateway,
            store,
            settings,
            urls,
            nonces,
        }
    }

    pub async fn handle_request(
        &self,
        signals: &RequestSignals,
        merchant: &MerchantInfo,
    ) -> ConnectOutcome {
        let Some(trigger) = signals.trigger() else {
            return ConnectOutcome::PassThrough;
        };

        match trigger {
            Trigger::Login { nonce } => {
                if !self.nonce_is_valid(LOGIN, nonce) {
                    return ConnectOutcome::Notice(Notice::error(notice::LINK_EXPIRED));
                }
                match self.redirect_to_login().await {
                    Ok(redirect) => ConnectOutcome::Redirect(redirect),
                    Err(e) => {
                        warn!(error = %e, "login link request failed");
                        ConnectOutcome::Notice(Notice::error(notice::LOGIN_FAILED))
                    }
                }
            }
            Trigger::ConnectionSuccess => {
                ConnectOutcome::Notice(Notice::success(notice::CONNECTION_SUCCESS))
            }
            Trigger::Connect { nonce } => {
                if !self.nonce_is_valid(CONNECT, nonce) {
                    return ConnectOutcome::Notice(Notice::error(notice::LINK_EXPIRED));
                }
                match self.init_oauth(merchant).await {
                    Ok(redirect) => ConnectOutcome::Redirect(redirect),
                    Err(e) => {
                        error!(error = %e, "init oauth flow failed");
                        ConnectOutcome::Notice(Notice::error(notice::CONNECT_FAILED))
                    }
                }
            }
            Trigger::Finalize { state, mode } => self.finalize_connection(state, mode).await,
        }
    }

    fn nonce_is_valid(&self, action: &str, nonce: Option<&str>) -> bool {
        let valid = nonce
            .map(|token| self.nonces.verify(action, token))
            .unwrap_or(false);
        if !valid {
            warn!(action = action, "rejected admin link with missing or invalid nonce");
        }
        valid
    }

    async fn redirect_to_login(&self) -> AccountResult<Redirect> {
        degrade("invalidate account", self.store.invalidate_account().await);

        let login = self
            .gateway
            .get_login_data(&self.urls.settings_url())
            .await?;

        Ok(Redirect {
            location: self.urls.safe_redirect(&login.url),
        })
    }

    async fn init_oauth(&self, merchant: &MerchantInfo) -> AccountResult<Redirect> {
        degrade("invalidate account", self.store.invalidate_account().await);

        info!(
            email = %mask_email(&merchant.email),
            business_name = %merchant.business_name,
            "starting account connection"
        );

        match self
            .gateway
            .get_oauth_data(&self.urls.settings_url(), merchant)
            .await?
        {
            OAuthRedirect::AlreadyConnected => {
                self.settings.enable().await?;
                info!("payments API reports the store is already connected");
                Ok(Redirect {
                    location: self.urls.connection_success_url(),
                })
            }
            OAuthRedirect::Authorize { url, state } => {
                self.store
                    .store_oauth_session(&OAuthSession {
                        expected_state: state,
                    })
                    .await?;
                Ok(Redirect {
                    location: self.urls.safe_redirect(&url),
                })
            }
        }
    }

    /// A mismatched callback leaves the pending session in place, so the
    /// genuine callback can still complete within the session's lifetime.
    async fn finalize_connection(&self, state: &str, mode: ConnectMode) -> ConnectOutcome {
        let session = degrade("read oauth session", self.store.oauth_session().await).flatten();

        let matches = session
            .map(|s| secure_eq(s.expected_state.as_bytes(), state.as_bytes()))
            .unwrap_or(false);
        if !matches {
            warn!("oauth callback state does not match the pending session");
            return ConnectOutcome::Notice(Notice::error(notice::FINALIZE_FAILED));
        }

        degrade("clear oauth session", self.store.clear_oauth_session().await);
        degrade("invalidate account", self.store.invalidate_account().await);

        if let Err(e) = self.apply_connection_settings(mode).await {
            error!(error = %e, "failed to save gateway settings after connection");
            return ConnectOutcome::Notice(Notice::error(notice::FINALIZE_FAILED));
        }

        info!(test_mode = mode.is_test(), "payments account connected");
        ConnectOutcome::Redirect(Redirect {
            location: self.urls.connection_success_url(),
        })
    }

    async fn apply_connection_settings(&self, mode: ConnectMode) -> AccountResult<()> {
        self.settings.enable().await?;
        self.settings.set_test_mode(mode.is_test()).await?;
        Ok(())
    }
}
