//! Secret source capability trait.
//!
//! Keeps the renderer decoupled from the HTTP client: the real
//! implementation is an authenticated [`crate::Session`], tests use
//! recording mocks.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::error::ReadError;

/// A source of secrets addressable by hierarchical path.
///
/// Every call is an independent read; implementations do not cache and
/// do not retry.
pub trait SecretSource: Send + Sync {
    /// Read the secret at `path` as a plain string.
    ///
    /// # Errors
    ///
    /// Returns a [`ReadError`] describing the first failure; reads are
    /// never retried.
    fn read_string(&self, path: &str) -> Result<String, ReadError>;

    /// Read the secret at `path` as base64-encoded binary and decode it.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError::Encoding`] if the stored value is not valid
    /// base64, or any error from [`SecretSource::read_string`].
    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, ReadError> {
        let value = self.read_string(path)?;
        BASE64.decode(value.as_bytes()).map_err(|source| ReadError::Encoding {
            path: path.to_string(),
            source,
        })
    }
}
