//! Type-safe cache key builders

use std::fmt;

pub const VERSION: &str = "v1";

pub mod account {
    use super::*;

    pub const NAMESPACE: &str = "account";

    /// Names of the per-store account entries.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum AccountKey {
        /// Last-known account snapshot.
        Data,
        /// Server-asserted pause on new account creation.
        OnboardingDisabled,
        /// Pending OAuth session awaiting its callback.
        OAuthState,
    }

    impl AccountKey {
        fn suffix(&self) -> &'static str {
            match self {
                AccountKey::Data => "data",
                AccountKey::OnboardingDisabled => "onboarding_disabled",
                AccountKey::OAuthState => "oauth_state",
            }
        }
    }

    impl fmt::Display for AccountKey {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}:{}:{}", VERSION, NAMESPACE, self.suffix())
        }
    }
}
