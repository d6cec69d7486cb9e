use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AccountStatus {
    #[serde(rename = "complete")]
    Complete,
    #[serde(rename = "restricted_soon")]
    RestrictedSoon,
    #[serde(rename = "restricted")]
    Restricted,
    #[serde(rename = "rejected.fraud")]
    RejectedFraud,
    #[serde(rename = "rejected.terms_of_service")]
    RejectedTermsOfService,
    #[serde(rename = "rejected.listed")]
    RejectedListed,
    #[serde(rename = "rejected.other")]
    RejectedOther,
    #[serde(rename = "unknown", other)]
    Unknown,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Complete => "complete",
            AccountStatus::RestrictedSoon => "restricted_soon",
            AccountStatus::Restricted => "restricted",
            AccountStatus::RejectedFraud => "rejected.fraud",
            AccountStatus::RejectedTermsOfService => "rejected.terms_of_service",
            AccountStatus::RejectedListed => "rejected.listed",
            AccountStatus::RejectedOther => "rejected.other",
            AccountStatus::Unknown => "unknown",
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(
            self,
            AccountStatus::RejectedFraud
                | AccountStatus::RejectedTermsOfService
                | AccountStatus::RejectedListed
                | AccountStatus::RejectedOther
        )
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DepositsStatus {
    Disabled,
    Daily,
    Weekly,
    Monthly,
    Manual,
    #[serde(other)]
    Unknown,
}

/// The merchant's remote payments account as reported by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountRecord {
    pub account_id: String,
    pub is_live: bool,
    pub test_publishable_key: String,
    pub live_publishable_key: String,
    pub status: AccountStatus,
    pub payments_enabled: bool,
    pub deposits_status: DepositsStatus,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub current_deadline: Option<DateTime<Utc>>,
}

impl AccountRecord {
    pub fn publishable_key(&self, is_test: bool) -> &str {
        if is_test {
            &self.test_publishable_key
        } else {
            &self.live_publishable_key
        }
    }
}

/// What the store knows about its account. `NoAccount` is an authoritative
/// answer from the API and is cached like any other.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccountSnapshot {
    Connected(AccountRecord),
    NoAccount,
}

impl AccountSnapshot {
    pub fn is_connected(&self) -> bool {
        matches!(self, AccountSnapshot::Connected(_))
    }

    pub fn record(&self) -> Option<&AccountRecord> {
        match self {
            AccountSnapshot::Connected(record) => Some(record),
            AccountSnapshot::NoAccount => None,
        }
    }
}

impl From<AccountRecord> for AccountSnapshot {
    fn from(record: AccountRecord) -> Self {
        AccountSnapshot::Connected(record)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginData {
    pub url: String,
}

/// Merchant details sent along when starting onboarding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MerchantInfo {
    pub email: String,
    pub business_name: String,
}

/// Result of asking the API to start the OAuth handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OAuthRedirect {
    /// The API has nothing to authorize: the store already owns an account.
    AlreadyConnected,
    Authorize { url: String, state: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn sample_record() -> AccountRecord {
        AccountRecord {
            account_id: "acct_1".to_string(),
            is_live: true,
            test_publishable_key: "pk_test_1".to_string(),
            live_publishable_key: "pk_live_1".to_string(),
            status: AccountStatus::Complete,
            payments_enabled: true,
            deposits_status: DepositsStatus::Daily,
            current_deadline: None,
        }
    }

    #[test]
    fn account_record_deserializes_from_api_json() {
        let payload = serde_json::json!({
            "account_id": "acct_1",
            "is_live": false,
            "test_publishable_key": "pk_test_1",
            "live_publishable_key": "pk_live_1",
            "status": "restricted_soon",
            "payments_enabled": true,
            "deposits_status": "weekly",
            "current_deadline": 1767225600
        });
        let record: AccountRecord =
            serde_json::from_value(payload).expect("deserialization should succeed");
        assert_eq!(record.status, AccountStatus::RestrictedSoon);
        assert_eq!(record.deposits_status, DepositsStatus::Weekly);
        assert_eq!(
            record.current_deadline.map(|d| d.timestamp()),
            Some(1767225600)
        );
        assert_eq!(record.publishable_key(true), "pk_test_1");
    }

    #[test]
    fn unknown_statuses_do_not_fail_parsing() {
        let payload = serde_json::json!({
            "account_id": "acct_1",
            "is_live": true,
            "test_publishable_key": "",
            "live_publishable_key": "",
            "status": "under_review",
            "payments_enabled": false,
            "deposits_status": "instant"
        });
        let record: AccountRecord = serde_json::from_value(payload).unwrap();
        assert_eq!(record.status, AccountStatus::Unknown);
        assert_eq!(record.deposits_status, DepositsStatus::Unknown);
        assert!(record.current_deadline.is_none());
    }

    #[test]
    fn snapshot_keeps_no_account_distinct() {
        let json = serde_json::to_value(AccountSnapshot::NoAccount).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "no_account"}));

        let connected = AccountSnapshot::from(sample_record());
        let json = serde_json::to_value(&connected).unwrap();
        assert_eq!(json["kind"], "connected");
        assert_eq!(json["account_id"], "acct_1");

        let back: AccountSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, connected);
    }

    #[test]
    fn rejected_statuses_are_grouped() {
        assert!(AccountStatus::RejectedListed.is_rejected());
        assert!(!AccountStatus::Restricted.is_rejected());
        assert_eq!(AccountStatus::RejectedFraud.to_string(), "rejected.fraud");
    }
}
