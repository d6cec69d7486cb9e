use thiserror::Error;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Error code the payments API uses when no account is attached to the store.
pub const ACCOUNT_NOT_FOUND_CODE: &str = "account_not_found";
/// Error code the payments API uses while new account creation is paused.
pub const ONBOARDING_DISABLED_CODE: &str = "on_boarding_disabled";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("No payments account is connected to this store")]
    NotFound,

    #[error("New account onboarding is temporarily disabled")]
    OnboardingDisabled,

    #[error("Payments API error: code={code}, message={message}")]
    Api {
        code: String,
        message: String,
        status: Option<u16>,
    },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Invalid payments API response: {message}")]
    InvalidResponse { message: String },
}

impl GatewayError {
    /// Classify an API error code. The two account codes get their own
    /// variants because callers cache them; everything else is opaque.
    pub fn from_code(code: &str, message: impl Into<String>, status: Option<u16>) -> Self {
        match code {
            ACCOUNT_NOT_FOUND_CODE => GatewayError::NotFound,
            ONBOARDING_DISABLED_CODE => GatewayError::OnboardingDisabled,
            _ => GatewayError::Api {
                code: code.to_string(),
                message: message.into(),
                status,
            },
        }
    }

    pub fn code(&self) -> &str {
        match self {
            GatewayError::NotFound => ACCOUNT_NOT_FOUND_CODE,
            GatewayError::OnboardingDisabled => ONBOARDING_DISABLED_CODE,
            GatewayError::Api { code, .. } => code,
            GatewayError::Network { .. } => "network_error",
            GatewayError::InvalidResponse { .. } => "invalid_response",
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::NotFound => false,
            GatewayError::OnboardingDisabled => false,
            GatewayError::Api { status, .. } => {
                matches!(status, Some(s) if *s == 429 || *s >= 500)
            }
            GatewayError::Network { .. } => true,
            GatewayError::InvalidResponse { .. } => false,
        }
    }

    /// Outcomes that describe the account rather than a failed call.
    pub fn is_account_state(&self) -> bool {
        matches!(self, GatewayError::NotFound | GatewayError::OnboardingDisabled)
    }

    pub fn user_message(&self) -> String {
        match self {
            GatewayError::NotFound => "No payments account is connected yet".to_string(),
            GatewayError::OnboardingDisabled => {
                "New account creation is temporarily paused".to_string()
            }
            GatewayError::Api { .. } => "The payments service returned an error".to_string(),
            GatewayError::Network { .. } => {
                "The payments service is temporarily unavailable".to_string()
            }
            GatewayError::InvalidResponse { .. } => {
                "The payments service returned an unexpected response".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_codes_map_to_dedicated_variants() {
        assert_eq!(
            GatewayError::from_code("account_not_found", "missing", Some(404)),
            GatewayError::NotFound
        );
        assert_eq!(
            GatewayError::from_code("on_boarding_disabled", "paused", Some(403)),
            GatewayError::OnboardingDisabled
        );
        assert!(matches!(
            GatewayError::from_code("invalid_token", "bad token", Some(401)),
            GatewayError::Api { status: Some(401), .. }
        ));
    }

    #[test]
    fn retryable_flags_are_set() {
        assert!(GatewayError::Network {
            message: "timeout".to_string()
        }
        .is_retryable());
        assert!(GatewayError::from_code("server_error", "boom", Some(502)).is_retryable());
        assert!(!GatewayError::from_code("invalid_token", "bad", Some(401)).is_retryable());
        assert!(!GatewayError::NotFound.is_retryable());
    }

    #[test]
    fn code_round_trips_for_account_states() {
        assert_eq!(GatewayError::NotFound.code(), ACCOUNT_NOT_FOUND_CODE);
        assert!(GatewayError::OnboardingDisabled.is_account_state());
        assert!(!GatewayError::Network {
            message: "reset".to_string()
        }
        .is_account_state());
    }
}
