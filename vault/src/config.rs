//! Vault client configuration and credential validation.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Fixed authentication retry budget.
pub const AUTH_RETRIES: u32 = 10;
/// Fixed delay between authentication attempts.
pub const RETRY_DELAY: Duration = Duration::from_secs(3);

/// Vault client configuration.
///
/// Exactly one authentication strategy must be selected: either `token`
/// alone, or `app_id` together with `user_id_path`.
#[derive(Debug, Clone)]
pub struct VaultConfig {
    /// Vault server address (protocol, hostname and port)
    pub addr: String,
    /// Bearer token for token authentication
    pub token: Option<SecretString>,
    /// Application identifier for app-id authentication
    pub app_id: Option<String>,
    /// Path to the per-host user identifier file
    pub user_id_path: Option<PathBuf>,
    /// Request timeout
    pub timeout: Duration,
    /// Maximum authentication attempts
    pub auth_retries: u32,
    /// Delay between authentication attempts
    pub retry_delay: Duration,
}

impl VaultConfig {
    /// Create a configuration with the default retry budget and timeout.
    #[must_use]
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            token: None,
            app_id: None,
            user_id_path: None,
            timeout: Duration::from_secs(30),
            auth_retries: AUTH_RETRIES,
            retry_delay: RETRY_DELAY,
        }
    }

    /// Select token authentication.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretString::from(token.into()));
        self
    }

    /// Select app-id authentication.
    #[must_use]
    pub fn with_app_id(mut self, app_id: impl Into<String>, user_id_path: impl Into<PathBuf>) -> Self {
        self.app_id = Some(app_id.into());
        self.user_id_path = Some(user_id_path.into());
        self
    }

    /// Set request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the authentication retry budget.
    #[must_use]
    pub const fn with_auth_retries(mut self, retries: u32) -> Self {
        self.auth_retries = retries;
        self
    }

    /// Set the delay between authentication attempts.
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Validate the authentication fields.
    ///
    /// Rules are checked in order and the first failure wins: the address
    /// must be non-empty, the two strategies are mutually exclusive, at
    /// least one must be selected, and the app-id strategy requires both
    /// the app id and the user-id file path.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] rule violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.addr.is_empty() {
            return Err(ConfigError::MissingAddress);
        }

        let has_token = self.token.is_some();
        let has_app_id = self.app_id.is_some();
        let has_user_id_path = self.user_id_path.is_some();

        if has_token && (has_app_id || has_user_id_path) {
            return Err(ConfigError::ConflictingStrategies);
        }

        if !has_token && !has_app_id && !has_user_id_path {
            return Err(ConfigError::NoStrategy);
        }

        if has_app_id != has_user_id_path {
            return Err(ConfigError::IncompleteAppStrategy);
        }

        Ok(())
    }
}
