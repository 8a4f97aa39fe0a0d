//! Wire types for vault responses.

use serde::Deserialize;

/// Login response wrapper.
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    /// Auth block carrying the issued token
    pub auth: AuthData,
}

/// Auth block of a login response.
#[derive(Debug, Deserialize)]
pub struct AuthData {
    /// Bearer token issued by the login endpoint
    pub client_token: String,
}

/// Read response wrapper. The `data` map holds the secret payload; a
/// scalar secret is stored under the `value` key.
#[derive(Debug, Deserialize)]
pub struct ReadResponse {
    /// Secret payload
    pub data: serde_json::Map<String, serde_json::Value>,
}
