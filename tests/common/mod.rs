#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use merchant_connect::account::{AccountService, AccountStore, ConnectionStateMachine};
use merchant_connect::admin::{HmacNonce, NonceVerifier, UrlBuilder};
use merchant_connect::cache::{Clock, InMemoryCache};
use merchant_connect::payments::{
    AccountGateway, AccountRecord, AccountStatus, DepositsStatus, GatewayError, GatewayResult,
    LoginData, MerchantInfo, OAuthRedirect,
};
use merchant_connect::settings::{GatewaySettings, InMemorySettings, SettingsStore};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const SETTINGS_URL: &str = "https://shop.example/wp-admin/admin.php?page=payments";
pub const NONCE_SECRET: &str = "integration-secret-0123";

pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += chrono::Duration::from_std(by).unwrap();
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub fn account_record(is_live: bool) -> AccountRecord {
    AccountRecord {
        account_id: "acct_1Hh1a2b3c4d7Xq2".to_string(),
        is_live,
        test_publishable_key: "pk_test_abc".to_string(),
        live_publishable_key: "pk_live_abc".to_string(),
        status: AccountStatus::Complete,
        payments_enabled: true,
        deposits_status: DepositsStatus::Weekly,
        current_deadline: None,
    }
}

/// Gateway double with scripted answers and per-call counters.
pub struct CountingGateway {
    pub account: Mutex<GatewayResult<AccountRecord>>,
    pub login: Mutex<GatewayResult<LoginData>>,
    pub oauth: Mutex<GatewayResult<OAuthRedirect>>,
    pub account_calls: AtomicUsize,
    pub login_calls: AtomicUsize,
    pub oauth_calls: AtomicUsize,
    pub last_return_url: Mutex<Option<String>>,
    pub last_merchant: Mutex<Option<MerchantInfo>>,
}

impl CountingGateway {
    pub fn new() -> Self {
        Self {
            account: Mutex::new(Err(GatewayError::NotFound)),
            login: Mutex::new(Ok(LoginData {
                url: "https://connect.stripe.com/express/login/abc".to_string(),
            })),
            oauth: Mutex::new(Ok(OAuthRedirect::Authorize {
                url: "https://connect.stripe.com/oauth/authorize?state=s-123".to_string(),
                state: "s-123".to_string(),
            })),
            account_calls: AtomicUsize::new(0),
            login_calls: AtomicUsize::new(0),
            oauth_calls: AtomicUsize::new(0),
            last_return_url: Mutex::new(None),
            last_merchant: Mutex::new(None),
        }
    }

    pub fn answer_account(&self, result: GatewayResult<AccountRecord>) {
        *self.account.lock().unwrap() = result;
    }

    pub fn answer_oauth(&self, result: GatewayResult<OAuthRedirect>) {
        *self.oauth.lock().unwrap() = result;
    }

    pub fn answer_login(&self, result: GatewayResult<LoginData>) {
        *self.login.lock().unwrap() = result;
    }

    pub fn account_calls(&self) -> usize {
        self.account_calls.load(Ordering::SeqCst)
    }

    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub fn oauth_calls(&self) -> usize {
        self.oauth_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccountGateway for CountingGateway {
    async fn get_account_data(&self) -> GatewayResult<AccountRecord> {
        self.account_calls.fetch_add(1, Ordering::SeqCst);
        self.account.lock().unwrap().clone()
    }

    async fn get_login_data(&self, return_url: &str) -> GatewayResult<LoginData> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_return_url.lock().unwrap() = Some(return_url.to_string());
        self.login.lock().unwrap().clone()
    }

    async fn get_oauth_data(
        &self,
        return_url: &str,
        merchant: &MerchantInfo,
    ) -> GatewayResult<OAuthRedirect> {
        self.oauth_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_return_url.lock().unwrap() = Some(return_url.to_string());
        *self.last_merchant.lock().unwrap() = Some(merchant.clone());
        self.oauth.lock().unwrap().clone()
    }
}

/// Everything wired together over one in-memory cache and one clock.
pub struct Harness {
    pub clock: Arc<ManualClock>,
    pub cache: Arc<InMemoryCache>,
    pub gateway: Arc<CountingGateway>,
    pub settings_store: Arc<InMemorySettings>,
    pub settings: GatewaySettings,
    pub store: AccountStore,
    pub nonces: Arc<HmacNonce>,
    pub urls: Arc<UrlBuilder>,
    pub accounts: AccountService,
    pub onboarding: ConnectionStateMachine,
}

impl Harness {
    pub fn new() -> Self {
        let clock = Arc::new(ManualClock::new());
        let cache = Arc::new(InMemoryCache::with_clock(clock.clone()));
        let gateway = Arc::new(CountingGateway::new());
        let settings_store = Arc::new(InMemorySettings::new());
        let settings = GatewaySettings::new(settings_store.clone());
        let store = AccountStore::new(cache.clone());
        let nonces = Arc::new(HmacNonce::new(NONCE_SECRET).with_clock(clock.clone()));
        let urls = Arc::new(
            UrlBuilder::new(
                SETTINGS_URL,
                vec!["connect.stripe.com".to_string()],
                nonces.clone(),
            )
            .unwrap(),
        );

        let accounts = AccountService::new(
            gateway.clone(),
            store.clone(),
            settings.clone(),
            urls.clone(),
        )
        .with_clock(clock.clone());
        let onboarding = ConnectionStateMachine::new(
            gateway.clone(),
            store.clone(),
            settings.clone(),
            urls.clone(),
            nonces.clone(),
        );

        Self {
            clock,
            cache,
            gateway,
            settings_store,
            settings,
            store,
            nonces,
            urls,
            accounts,
            onboarding,
        }
    }

    pub async fn set_dev_mode(&self, on: bool) {
        self.settings.set_dev_mode(on).await.unwrap();
    }

    pub async fn setting(&self, key: &str) -> Option<String> {
        self.settings_store.get(key).await.unwrap()
    }

    pub fn nonce(&self, action: &str) -> String {
        self.nonces.create(action)
    }
}

pub fn merchant() -> MerchantInfo {
    MerchantInfo {
        email: "owner@shop.example".to_string(),
        business_name: "Corner Shop".to_string(),
    }
}
