//! HashiCorp Vault client for vellum.
//!
//! Validates authentication credentials, establishes an authenticated
//! session with bounded retry, and reads secrets by path.

pub mod client;
pub mod config;
pub mod error;
pub mod provider;
pub mod secrets;

pub use client::{Session, VaultClient};
pub use config::VaultConfig;
pub use error::{AuthError, ConfigError, ReadError, StoreError};
pub use provider::SecretSource;
