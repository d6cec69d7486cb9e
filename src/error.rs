//! Application error handling
//!
//! Unified error type for the HTTP boundary, with status mapping,
//! user-facing messages and structured error codes for client handling.

use crate::account::AccountError;
use crate::cache::CacheError;
use crate::config::ConfigError;
use crate::payments::GatewayError;
use crate::settings::SettingsError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error codes for programmatic handling
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorCode {
    // Domain errors (4xx)
    #[serde(rename = "ACCOUNT_NOT_CONNECTED")]
    AccountNotConnected,
    #[serde(rename = "ONBOARDING_DISABLED")]
    OnboardingDisabled,

    // Infrastructure errors (5xx)
    #[serde(rename = "CACHE_ERROR")]
    CacheError,
    #[serde(rename = "SETTINGS_ERROR")]
    SettingsError,
    #[serde(rename = "CONFIGURATION_ERROR")]
    ConfigurationError,

    // External errors (502, 503)
    #[serde(rename = "PAYMENTS_API_ERROR")]
    PaymentsApiError,
    #[serde(rename = "RATE_LIMIT_ERROR")]
    RateLimitError,

    // Generic
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError,
    #[serde(rename = "VALIDATION_ERROR")]
    ValidationError,
}

/// Account state errors the client can act on
#[derive(Debug, Clone)]
pub enum DomainError {
    /// No payments account is attached to the store
    AccountNotConnected,
    /// The payments API has paused new account creation
    OnboardingDisabled,
}

/// Infrastructure-level errors (cache, settings, configuration)
#[derive(Debug, Clone)]
pub enum InfrastructureError {
    /// Cache backend unavailable or returned bad data
    Cache { message: String },
    /// Gateway settings could not be read or written
    Settings { message: String },
    /// Missing or invalid configuration
    Configuration { message: String },
}

/// Payments API errors
#[derive(Debug, Clone)]
pub enum ExternalError {
    PaymentsApi {
        code: String,
        message: String,
        is_retryable: bool,
    },
    RateLimit { service: String },
}

/// Input validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    /// Query or body parameter has an unusable value
    InvalidParameter { field: String, reason: String },
    /// Required field missing
    MissingField { field: String },
}

/// Unified application error type
#[derive(Debug, Clone)]
pub struct AppError {
    pub kind: AppErrorKind,
    pub request_id: Option<String>,
    pub context: Option<String>,
}

#[derive(Debug, Clone)]
pub enum AppErrorKind {
    Domain(DomainError),
    Infrastructure(InfrastructureError),
    External(ExternalError),
    Validation(ValidationError),
}

impl AppError {
    pub fn new(kind: AppErrorKind) -> Self {
        Self {
            kind,
            request_id: None,
            context: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Map error to HTTP status code
    pub fn status_code(&self) -> u16 {
        match &self.kind {
            AppErrorKind::Domain(err) => match err {
                DomainError::AccountNotConnected => 404,
                DomainError::OnboardingDisabled => 409, // Conflict
            },
            AppErrorKind::Infrastructure(_) => 500,
            AppErrorKind::External(err) => match err {
                ExternalError::PaymentsApi { .. } => 502, // Bad Gateway
                ExternalError::RateLimit { .. } => 429,
            },
            AppErrorKind::Validation(_) => 400,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> ErrorCode {
        match &self.kind {
            AppErrorKind::Domain(err) => match err {
                DomainError::AccountNotConnected => ErrorCode::AccountNotConnected,
                DomainError::OnboardingDisabled => ErrorCode::OnboardingDisabled,
            },
            AppErrorKind::Infrastructure(err) => match err {
                InfrastructureError::Cache { .. } => ErrorCode::CacheError,
                InfrastructureError::Settings { .. } => ErrorCode::SettingsError,
                InfrastructureError::Configuration { .. } => ErrorCode::ConfigurationError,
            },
            AppErrorKind::External(err) => match err {
                ExternalError::PaymentsApi { .. } => ErrorCode::PaymentsApiError,
                ExternalError::RateLimit { .. } => ErrorCode::RateLimitError,
            },
            AppErrorKind::Validation(_) => ErrorCode::ValidationError,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match &self.kind {
            AppErrorKind::Domain(err) => match err {
                DomainError::AccountNotConnected => {
                    "No payments account is connected to this store".to_string()
                }
                DomainError::OnboardingDisabled => {
                    "New account creation is temporarily paused".to_string()
                }
            },
            AppErrorKind::Infrastructure(_) => {
                "Service temporarily unavailable. Please try again later".to_string()
            }
            AppErrorKind::External(err) => match err {
                ExternalError::PaymentsApi { is_retryable, .. } => {
                    if *is_retryable {
                        "Payments service is temporarily unavailable. Please try again".to_string()
                    } else {
                        "Payments service rejected the request. Please contact support".to_string()
                    }
                }
                ExternalError::RateLimit { service } => {
                    format!("Rate limit exceeded for {}. Please try again later", service)
                }
            },
            AppErrorKind::Validation(err) => match err {
                ValidationError::InvalidParameter { field, reason } => {
                    format!("Invalid value for '{}': {}", field, reason)
                }
                ValidationError::MissingField { field } => {
                    format!("Required field '{}' is missing", field)
                }
            },
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        match &self.kind {
            AppErrorKind::Domain(_) => false,
            AppErrorKind::Infrastructure(err) => match err {
                InfrastructureError::Cache { .. } => true,
                InfrastructureError::Settings { .. } => true,
                InfrastructureError::Configuration { .. } => false,
            },
            AppErrorKind::External(err) => match err {
                ExternalError::PaymentsApi { is_retryable, .. } => *is_retryable,
                ExternalError::RateLimit { .. } => true,
            },
            AppErrorKind::Validation(_) => false,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for AppError {}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        let is_retryable = err.is_retryable();
        let kind = match err {
            GatewayError::NotFound => AppErrorKind::Domain(DomainError::AccountNotConnected),
            GatewayError::OnboardingDisabled => {
                AppErrorKind::Domain(DomainError::OnboardingDisabled)
            }
            GatewayError::Api {
                status: Some(429), ..
            } => AppErrorKind::External(ExternalError::RateLimit {
                service: "payments API".to_string(),
            }),
            GatewayError::Api { code, message, .. } => {
                AppErrorKind::External(ExternalError::PaymentsApi {
                    code,
                    message,
                    is_retryable,
                })
            }
            GatewayError::Network { message } => {
                AppErrorKind::External(ExternalError::PaymentsApi {
                    code: "network_error".to_string(),
                    message,
                    is_retryable,
                })
            }
            GatewayError::InvalidResponse { message } => {
                AppErrorKind::External(ExternalError::PaymentsApi {
                    code: "invalid_response".to_string(),
                    message,
                    is_retryable,
                })
            }
        };
        AppError::new(kind)
    }
}

impl From<CacheError> for AppError {
    fn from(err: CacheError) -> Self {
        AppError::new(AppErrorKind::Infrastructure(InfrastructureError::Cache {
            message: err.to_string(),
        }))
    }
}

impl From<SettingsError> for AppError {
    fn from(err: SettingsError) -> Self {
        AppError::new(AppErrorKind::Infrastructure(InfrastructureError::Settings {
            message: err.to_string(),
        }))
    }
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Gateway(e) => e.into(),
            AccountError::Cache(e) => e.into(),
            AccountError::Settings(e) => e.into(),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::new(AppErrorKind::Infrastructure(
            InfrastructureError::Configuration {
                message: err.to_string(),
            },
        ))
    }
}

pub type AppResult<T> = Result<T, AppError>;
