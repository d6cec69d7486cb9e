//! Anti-forgery tokens for the `login` and `connect` admin links.
//!
//! A token is an HMAC over the action name and a time tick. Ticks are half a
//! lifetime long and the previous tick is still accepted, so a token stays
//! valid for between one half and one full lifetime.

use crate::cache::{Clock, SystemClock};
use crate::payments::utils::secure_eq;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;
use std::time::Duration;

type HmacSha256 = Hmac<Sha256>;

/// Hex characters kept from the MAC.
const TOKEN_LEN: usize = 20;

pub const DEFAULT_NONCE_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

pub trait NonceVerifier: Send + Sync {
    fn create(&self, action: &str) -> String;
    fn verify(&self, action: &str, token: &str) -> bool;
}

pub struct HmacNonce {
    secret: Vec<u8>,
    lifetime: Duration,
    clock: Arc<dyn Clock>,
}

impl HmacNonce {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            lifetime: DEFAULT_NONCE_LIFETIME,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn tick(&self) -> i64 {
        let half = (self.lifetime.as_secs() / 2).max(1) as i64;
        self.clock.now().timestamp().div_euclid(half)
    }

    fn token_for(&self, action: &str, tick: i64) -> Option<String> {
        let mut mac = HmacSha256::new_from_slice(&self.secret).ok()?;
        mac.update(format!("{}|{}", tick, action).as_bytes());
        let digest = hex::encode(mac.finalize().into_bytes());
        Some(digest[..TOKEN_LEN].to_string())
    }
}

impl NonceVerifier for HmacNonce {
    fn create(&self, action: &str) -> String {
        // HMAC accepts keys of any length
        self.token_for(action, self.tick()).unwrap_or_default()
    }

    fn verify(&self, action: &str, token: &str) -> bool {
        let token = token.trim();
        if token.len() != TOKEN_LEN {
            return false;
        }
        let tick = self.tick();
        [tick, tick - 1].iter().any(|t| {
            self.token_for(action, *t)
                .map(|expected| secure_eq(expected.as_bytes(), token.as_bytes()))
                .unwrap_or(false)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::cache::tests::ManualClock;
    use chrono::Utc;

    fn nonce_with_clock() -> (HmacNonce, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let nonce = HmacNonce::new("test-secret-0123456789")
            .with_lifetime(Duration::from_secs(3600))
            .with_clock(clock.clone());
        (nonce, clock)
    }

    #[test]
    fn created_token_verifies_for_its_action_only() {
        let (nonce, _) = nonce_with_clock();
        let token = nonce.create("login");

        assert_eq!(token.len(), TOKEN_LEN);
        assert!(nonce.verify("login", &token));
        assert!(!nonce.verify("connect", &token));
        assert!(!nonce.verify("login", "garbage"));
    }

    #[test]
    fn token_expires_after_its_lifetime() {
        let (nonce, clock) = nonce_with_clock();
        let token = nonce.create("connect");

        clock.advance(Duration::from_secs(1799));
        assert!(nonce.verify("connect", &token));

        clock.advance(Duration::from_secs(3600));
        assert!(!nonce.verify("connect", &token));
    }

    #[test]
    fn different_secrets_do_not_cross_verify() {
        let (nonce, _) = nonce_with_clock();
        let other = HmacNonce::new("another-secret-98765");
        assert!(!other.verify("login", &nonce.create("login")));
    }
}
