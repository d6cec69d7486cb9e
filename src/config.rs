//! Application configuration module
//! Handles environment variable loading, configuration validation, and application settings

use std::env;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub cache: CacheSettings,
    pub logging: LoggingConfig,
    pub payments_api: PaymentsApiConfig,
    pub connect: ConnectConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Run without Redis, keeping account state in process memory
    pub skip_externals: bool,
}

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub redis_url: String,
    pub max_connections: u32,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log format options
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Plain,
}

/// Remote payments API configuration
#[derive(Debug, Clone)]
pub struct PaymentsApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

/// Store-side settings for the connection handshake
#[derive(Debug, Clone)]
pub struct ConnectConfig {
    /// Absolute URL of the payments settings page in the store admin
    pub settings_url: String,
    pub business_name: String,
    pub admin_email: String,
    /// Secret used to sign `login`/`connect` links
    pub nonce_secret: String,
    /// Initial value of the `dev_mode` gateway setting
    pub dev_mode: bool,
    /// Hosts, besides the store itself, that handshake redirects may target
    pub allowed_redirect_hosts: Vec<String>,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        let _ = dotenv::dotenv().ok();

        Ok(AppConfig {
            server: ServerConfig::from_env()?,
            cache: CacheSettings::from_env()?,
            logging: LoggingConfig::from_env()?,
            payments_api: PaymentsApiConfig::from_env()?,
            connect: ConnectConfig::from_env()?,
        })
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        if !self.server.skip_externals {
            self.cache.validate()?;
        }
        self.logging.validate()?;
        self.payments_api.validate()?;
        self.connect.validate()?;

        Ok(())
    }
}

fn parse_bool(name: &str, default: &str) -> Result<bool, ConfigError> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .to_lowercase()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(name.to_string()))
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(ServerConfig {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".to_string()))?,
            skip_externals: parse_bool("SKIP_EXTERNALS", "false")?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidValue(
                "SERVER_PORT cannot be 0".to_string(),
            ));
        }

        if self.host.is_empty() {
            return Err(ConfigError::InvalidValue(
                "SERVER_HOST cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

impl CacheSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(CacheSettings {
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            max_connections: env::var("CACHE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("CACHE_MAX_CONNECTIONS".to_string()))?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.redis_url.is_empty() {
            return Err(ConfigError::InvalidValue("REDIS_URL".to_string()));
        }

        if !self.redis_url.starts_with("redis://") && !self.redis_url.starts_with("rediss://") {
            return Err(ConfigError::InvalidValue(
                "REDIS_URL must start with redis:// or rediss://".to_string(),
            ));
        }

        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "CACHE_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(())
    }
}

impl LoggingConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "INFO".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "plain".to_string())
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Plain,
            },
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];
        if !valid_levels.contains(&self.level.to_uppercase().as_str()) {
            return Err(ConfigError::InvalidValue("LOG_LEVEL".to_string()));
        }

        Ok(())
    }
}

impl PaymentsApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(PaymentsApiConfig {
            base_url: env::var("PAYMENTS_API_BASE_URL")
                .map_err(|_| ConfigError::MissingVariable("PAYMENTS_API_BASE_URL".to_string()))?,
            api_key: env::var("PAYMENTS_API_KEY").ok().filter(|k| !k.is_empty()),
            timeout_secs: env::var("PAYMENTS_API_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PAYMENTS_API_TIMEOUT_SECS".to_string()))?,
            max_retries: env::var("PAYMENTS_API_MAX_RETRIES")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PAYMENTS_API_MAX_RETRIES".to_string()))?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_http_url(&self.base_url) {
            return Err(ConfigError::InvalidValue(
                "PAYMENTS_API_BASE_URL must be a valid URL".to_string(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "PAYMENTS_API_TIMEOUT_SECS".to_string(),
            ));
        }

        Ok(())
    }
}

impl ConnectConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(ConnectConfig {
            settings_url: env::var("STORE_SETTINGS_URL")
                .map_err(|_| ConfigError::MissingVariable("STORE_SETTINGS_URL".to_string()))?,
            business_name: env::var("STORE_BUSINESS_NAME").unwrap_or_default(),
            admin_email: env::var("STORE_ADMIN_EMAIL").unwrap_or_default(),
            nonce_secret: env::var("CONNECT_NONCE_SECRET")
                .map_err(|_| ConfigError::MissingVariable("CONNECT_NONCE_SECRET".to_string()))?,
            dev_mode: parse_bool("CONNECT_DEV_MODE", "false")?,
            allowed_redirect_hosts: env::var("CONNECT_ALLOWED_REDIRECT_HOSTS")
                .unwrap_or_else(|_| "connect.stripe.com".to_string())
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_http_url(&self.settings_url) {
            return Err(ConfigError::InvalidValue(
                "STORE_SETTINGS_URL must be a valid URL".to_string(),
            ));
        }

        if self.nonce_secret.len() < 16 {
            return Err(ConfigError::ValidationFailed(
                "CONNECT_NONCE_SECRET must be at least 16 characters".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),

    #[error("Invalid value for configuration: {0}")]
    InvalidValue(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connect_config() -> ConnectConfig {
        ConnectConfig {
            settings_url: "https://shop.example/admin/payments".to_string(),
            business_name: "Shop".to_string(),
            admin_email: "owner@shop.example".to_string(),
            nonce_secret: "0123456789abcdef".to_string(),
            dev_mode: false,
            allowed_redirect_hosts: vec!["connect.stripe.com".to_string()],
        }
    }

    #[test]
    fn test_server_config_validation() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            skip_externals: false,
        };

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_port_validation() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            skip_externals: false,
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_redis_url_scheme_validation() {
        let config = CacheSettings {
            redis_url: "http://127.0.0.1:6379".to_string(),
            max_connections: 10,
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_connect_config_validation() {
        assert!(connect_config().validate().is_ok());

        let mut short_secret = connect_config();
        short_secret.nonce_secret = "short".to_string();
        assert!(matches!(
            short_secret.validate(),
            Err(ConfigError::ValidationFailed(_))
        ));

        let mut relative_url = connect_config();
        relative_url.settings_url = "/admin/payments".to_string();
        assert!(relative_url.validate().is_err());
    }

    #[test]
    fn test_payments_api_validation() {
        let config = PaymentsApiConfig {
            base_url: "https://api.example.com".to_string(),
            api_key: None,
            timeout_secs: 0,
            max_retries: 3,
        };

        assert!(config.validate().is_err());
    }
}
