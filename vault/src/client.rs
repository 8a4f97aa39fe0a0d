//! Vault HTTP client and authenticated session.
//!
//! [`VaultClient`] is the plain HTTP surface (no retry, no policy);
//! [`Session`] layers credential-strategy selection and the bounded
//! authentication retry loop on top, and implements [`SecretSource`]
//! for per-path reads.

use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, instrument, warn};

use crate::config::VaultConfig;
use crate::error::{AuthError, ConfigError, ReadError, StoreError};
use crate::provider::SecretSource;
use crate::secrets::{AuthResponse, ReadResponse};

/// Low-level vault HTTP client. Stateless between calls: the bearer
/// token is attached per request by the caller.
#[derive(Debug)]
pub struct VaultClient {
    http: reqwest::blocking::Client,
    addr: String,
}

impl VaultClient {
    /// Build a client for the configured server address.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::ClientBuild`] if the HTTP client cannot be
    /// constructed.
    pub fn new(config: &VaultConfig) -> Result<Self, AuthError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(AuthError::ClientBuild)?;

        Ok(Self {
            http,
            addr: config.addr.trim_end_matches('/').to_string(),
        })
    }

    /// Confirm a token is valid by looking up its own properties.
    fn lookup_self(&self, token: &str) -> Result<(), StoreError> {
        let url = format!("{}/v1/auth/token/lookup-self", self.addr);
        let response = self.http.get(&url).header("X-Vault-Token", token).send()?;
        check_status(response)?;
        Ok(())
    }

    /// POST an app-id login and return the raw response body.
    fn login_app_id(&self, app_id: &str, user_id: &str) -> Result<String, StoreError> {
        let url = format!("{}/v1/auth/app-id/login", self.addr);
        let body = serde_json::json!({ "app_id": app_id, "user_id": user_id });
        let response = self.http.post(&url).json(&body).send()?;
        let response = check_status(response)?;
        Ok(response.text()?)
    }

    /// GET the secret at `path`. `Ok(None)` means nothing is stored there.
    fn read_raw(&self, token: &str, path: &str) -> Result<Option<String>, StoreError> {
        let url = format!("{}/v1/{}", self.addr, path.trim_start_matches('/'));
        let response = self.http.get(&url).header("X-Vault-Token", token).send()?;

        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        let response = check_status(response)?;
        Ok(Some(response.text()?))
    }
}

fn check_status(
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Run `op` up to `retries` times with a fixed delay between attempts.
///
/// Any transport/status failure is considered transient here; the vault
/// is expected to be briefly unavailable during leader elections and
/// cold starts, and the fixed budget bounds worst-case startup latency.
fn retry_auth<T>(
    retries: u32,
    delay: Duration,
    mut op: impl FnMut() -> Result<T, StoreError>,
) -> Result<T, AuthError> {
    let budget = retries.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op() {
            Ok(value) => return Ok(value),
            Err(source) => {
                if attempt >= budget {
                    return Err(AuthError::Exhausted {
                        attempts: attempt,
                        source,
                    });
                }
                warn!(attempt, budget, error = %source, "vault auth failed, retrying");
                thread::sleep(delay);
            }
        }
    }
}

/// An authenticated vault session.
///
/// Created once per run; the bearer token is set at construction and
/// never mutated afterwards.
#[derive(Debug)]
pub struct Session {
    client: VaultClient,
    token: SecretString,
}

impl Session {
    /// Validate the config and establish an authenticated session using
    /// whichever strategy its fields select.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Config`] for invalid configuration,
    /// [`AuthError::IdentityFileUnreadable`] or
    /// [`AuthError::MalformedAuthResponse`] for permanent app-id
    /// failures, and [`AuthError::Exhausted`] once the retry budget is
    /// spent on transport/status failures.
    #[instrument(skip(config), fields(addr = %config.addr))]
    pub fn authenticate(config: &VaultConfig) -> Result<Self, AuthError> {
        config.validate()?;
        let client = VaultClient::new(config)?;

        if let Some(token) = &config.token {
            return Self::token_auth(client, token.clone(), config);
        }

        // validate() guarantees both app-id fields are present here.
        let app_id = config
            .app_id
            .clone()
            .ok_or(ConfigError::IncompleteAppStrategy)?;
        let user_id_path = config
            .user_id_path
            .clone()
            .ok_or(ConfigError::IncompleteAppStrategy)?;
        Self::app_id_auth(client, config, &app_id, &user_id_path)
    }

    /// Token strategy: adopt the given token, then confirm it with a
    /// self-lookup retried within the budget.
    fn token_auth(
        client: VaultClient,
        token: SecretString,
        config: &VaultConfig,
    ) -> Result<Self, AuthError> {
        retry_auth(config.auth_retries, config.retry_delay, || {
            client.lookup_self(token.expose_secret())
        })?;

        info!("authenticated with vault (token strategy)");
        Ok(Self { client, token })
    }

    /// App-identity strategy: the user id is the whole contents of the
    /// identity file; login issues the bearer token.
    fn app_id_auth(
        client: VaultClient,
        config: &VaultConfig,
        app_id: &str,
        user_id_path: &Path,
    ) -> Result<Self, AuthError> {
        let user_id =
            fs::read_to_string(user_id_path).map_err(|source| AuthError::IdentityFileUnreadable {
                path: user_id_path.to_path_buf(),
                source,
            })?;

        let body = retry_auth(config.auth_retries, config.retry_delay, || {
            client.login_app_id(app_id, &user_id)
        })?;

        // A 2xx body that doesn't carry auth.client_token is a permanent
        // failure, not a retryable one.
        let response: AuthResponse = serde_json::from_str(&body)
            .map_err(|e| AuthError::MalformedAuthResponse(e.to_string()))?;

        info!("authenticated with vault (app-id strategy)");
        Ok(Self {
            client,
            token: SecretString::from(response.auth.client_token),
        })
    }
}

impl SecretSource for Session {
    #[instrument(skip(self))]
    fn read_string(&self, path: &str) -> Result<String, ReadError> {
        debug!(path, "reading secret");

        let body = self
            .client
            .read_raw(self.token.expose_secret(), path)
            .map_err(|source| ReadError::StoreUnavailable {
                path: path.to_string(),
                source,
            })?
            .ok_or_else(|| ReadError::NotFound(path.to_string()))?;

        let response: ReadResponse =
            serde_json::from_str(&body).map_err(|_| ReadError::MalformedSecret(path.to_string()))?;

        match response.data.get("value") {
            Some(serde_json::Value::String(value)) => Ok(value.clone()),
            Some(_) => Err(ReadError::TypeMismatch(path.to_string())),
            None => Err(ReadError::MalformedSecret(path.to_string())),
        }
    }
}
