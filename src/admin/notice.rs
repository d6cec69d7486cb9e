use serde::{Deserialize, Serialize};

pub const LOGIN_FAILED: &str =
    "There was a problem redirecting you to the account dashboard. Please try again.";
pub const CONNECT_FAILED: &str =
    "There was a problem redirecting you to the account connection page. Please try again.";
pub const FINALIZE_FAILED: &str =
    "There was a problem processing your account data. Please try again.";
pub const CONNECTION_SUCCESS: &str =
    "Thanks for verifying your business details. You're ready to start taking payments!";
pub const LINK_EXPIRED: &str = "The link you followed has expired. Please try again.";
pub const CONNECT_PROMPT: &str = "Accept credit cards online. Simply verify your business details to get started. By clicking \"Verify details\", you agree to the Terms of Service.";
pub const ONBOARDING_PAUSED: &str = "Thank you for installing payments! We've temporarily paused new account creation. We'll notify you when we resume!";

pub const VERIFY_DETAILS_LABEL: &str = "Verify details";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Success,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoticeAction {
    pub label: String,
    pub url: String,
}

/// Admin notice shown on the payments settings page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<NoticeAction>,
}

impl Notice {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
            action: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Error)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Success)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Warning)
    }

    pub fn with_action(mut self, label: impl Into<String>, url: impl Into<String>) -> Self {
        self.action = Some(NoticeAction {
            label: label.into(),
            url: url.into(),
        });
        self
    }
}
