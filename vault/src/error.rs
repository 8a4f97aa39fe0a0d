//! Vault error types.
//!
//! Each pipeline stage has its own failure domain: configuration
//! validation, authentication, and per-secret reads. Retries happen only
//! during authentication; read failures are always fatal to the render.

use std::path::PathBuf;

use thiserror::Error;

/// Credential validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Vault address is empty
    #[error("invalid vault address: address must be non-empty")]
    MissingAddress,

    /// Both token and app-id authentication specified
    #[error("conflicting vault authentication strategies: both app_id and token specified")]
    ConflictingStrategies,

    /// No authentication strategy specified
    #[error("no vault authentication strategy: specify a token, or an app id and user-id path")]
    NoStrategy,

    /// App-id strategy is missing one of its two fields
    #[error("incomplete app-id strategy: specify an app id AND a user-id path")]
    IncompleteAppStrategy,
}

/// Transport and server failures talking to the vault.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Request never produced a response
    #[error("vault request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("vault returned status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, as far as it could be read
        body: String,
    },
}

/// Authentication errors.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Configuration failed validation
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// User-id file could not be read; never retried
    #[error("error reading vault user-id file {path}: {source}")]
    IdentityFileUnreadable {
        /// Path that was given for the user-id file
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Login response missing `auth.client_token`; never retried
    #[error("malformed vault auth response: {0}")]
    MalformedAuthResponse(String),

    /// Retry budget exhausted; wraps the last transport/status error
    #[error("vault authentication failed after {attempts} attempts: {source}")]
    Exhausted {
        /// Attempts performed before giving up
        attempts: u32,
        /// Last failure observed
        #[source]
        source: StoreError,
    },

    /// Client construction failed before any request was made
    #[error("error building vault client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

/// Per-secret read errors. None of these are retried: retry
/// responsibility stops at authentication.
#[derive(Error, Debug)]
pub enum ReadError {
    /// Transport or server failure during the read
    #[error("error reading secret from vault: {path}: {source}")]
    StoreUnavailable {
        /// Secret path that was being read
        path: String,
        /// Underlying failure
        #[source]
        source: StoreError,
    },

    /// No secret at the given path
    #[error("secret not found: {0}")]
    NotFound(String),

    /// Secret data is missing the expected `value` key
    #[error("secret at {0} missing 'value' key")]
    MalformedSecret(String),

    /// Value exists but is not a plain string
    #[error("unexpected type for value at {0}: expected string")]
    TypeMismatch(String),

    /// Value is not valid base64 (bytes reads only)
    #[error("vault path {path}: error decoding base64 value: {source}")]
    Encoding {
        /// Secret path that was being read
        path: String,
        /// Decode failure
        #[source]
        source: base64::DecodeError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        assert_eq!(
            ConfigError::MissingAddress.to_string(),
            "invalid vault address: address must be non-empty"
        );
    }

    #[test]
    fn test_read_error_display() {
        let err = ReadError::NotFound("secret/app/key".to_string());
        assert_eq!(err.to_string(), "secret not found: secret/app/key");
    }

    #[test]
    fn test_auth_error_wraps_config_error() {
        let err: AuthError = ConfigError::NoStrategy.into();
        assert!(matches!(err, AuthError::Config(ConfigError::NoStrategy)));
    }
}
