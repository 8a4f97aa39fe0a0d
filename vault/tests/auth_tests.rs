//! Authentication tests against a mock vault server.
//!
//! The client is synchronous, so the wiremock server is hosted on a
//! runtime owned by each test while requests are issued from the test
//! thread.

use std::io::Write;
use std::time::{Duration, Instant};

use serde_json::json;
use tokio::runtime::Runtime;
use vellum_vault::{AuthError, Session, VaultConfig};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn runtime() -> Runtime {
    Runtime::new().expect("tokio runtime")
}

fn test_config(addr: &str) -> VaultConfig {
    VaultConfig::new(addr)
        .with_auth_retries(3)
        .with_retry_delay(Duration::from_millis(20))
}

#[test]
fn token_auth_succeeds_on_first_lookup() {
    let rt = runtime();
    let server = rt.block_on(MockServer::start());

    rt.block_on(
        Mock::given(method("GET"))
            .and(path("/v1/auth/token/lookup-self"))
            .and(header("X-Vault-Token", "s.valid"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
            .expect(1)
            .mount(&server),
    );

    let config = test_config(&server.uri()).with_token("s.valid");
    Session::authenticate(&config).expect("session");

    rt.block_on(server.verify());
}

#[test]
fn token_auth_retries_transient_failures_then_succeeds() {
    let rt = runtime();
    let server = rt.block_on(MockServer::start());

    // Two failures, then success: exactly three lookups expected.
    rt.block_on(async {
        Mock::given(method("GET"))
            .and(path("/v1/auth/token/lookup-self"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/auth/token/lookup-self"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
            .expect(1)
            .mount(&server)
            .await;
    });

    let config = test_config(&server.uri()).with_token("s.valid");
    let started = Instant::now();
    Session::authenticate(&config).expect("session");

    // Two inter-attempt delays must have elapsed.
    assert!(started.elapsed() >= Duration::from_millis(40));
    rt.block_on(server.verify());
}

#[test]
fn token_auth_exhausts_budget_after_exact_attempt_count() {
    let rt = runtime();
    let server = rt.block_on(MockServer::start());

    rt.block_on(
        Mock::given(method("GET"))
            .and(path("/v1/auth/token/lookup-self"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server),
    );

    let config = test_config(&server.uri()).with_token("s.valid");
    let err = Session::authenticate(&config).expect_err("should exhaust");

    match err {
        AuthError::Exhausted { attempts, .. } => assert_eq!(attempts, 3),
        other => panic!("expected Exhausted, got {other:?}"),
    }
    rt.block_on(server.verify());
}

#[test]
fn app_id_auth_posts_file_contents_and_extracts_token() {
    let rt = runtime();
    let server = rt.block_on(MockServer::start());

    let mut user_id_file = tempfile::NamedTempFile::new().expect("temp file");
    write!(user_id_file, "host-user-42").expect("write user id");

    rt.block_on(async {
        Mock::given(method("POST"))
            .and(path("/v1/auth/app-id/login"))
            .and(body_json(json!({"app_id": "my-app", "user_id": "host-user-42"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "auth": {"client_token": "s.issued", "policies": ["default"]}
            })))
            .expect(1)
            .mount(&server)
            .await;
    });

    let config = test_config(&server.uri()).with_app_id("my-app", user_id_file.path());
    Session::authenticate(&config).expect("session");

    rt.block_on(server.verify());
}

#[test]
fn app_id_auth_unreadable_file_fails_without_any_request() {
    let rt = runtime();
    let server = rt.block_on(MockServer::start());

    let config =
        test_config(&server.uri()).with_app_id("my-app", "/nonexistent/vault-user-id");
    let err = Session::authenticate(&config).expect_err("should fail");

    assert!(matches!(err, AuthError::IdentityFileUnreadable { .. }));
    let requests = rt.block_on(server.received_requests()).unwrap_or_default();
    assert!(requests.is_empty(), "no login attempt should have been made");
}

#[test]
fn app_id_auth_malformed_response_is_not_retried() {
    let rt = runtime();
    let server = rt.block_on(MockServer::start());

    let mut user_id_file = tempfile::NamedTempFile::new().expect("temp file");
    write!(user_id_file, "host-user-42").expect("write user id");

    // 2xx with a body missing auth.client_token: permanent, one request only.
    rt.block_on(
        Mock::given(method("POST"))
            .and(path("/v1/auth/app-id/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"auth": {}})))
            .expect(1)
            .mount(&server),
    );

    let config = test_config(&server.uri()).with_app_id("my-app", user_id_file.path());
    let err = Session::authenticate(&config).expect_err("should fail");

    assert!(matches!(err, AuthError::MalformedAuthResponse(_)));
    rt.block_on(server.verify());
}

#[test]
fn app_id_auth_retries_server_errors() {
    let rt = runtime();
    let server = rt.block_on(MockServer::start());

    let mut user_id_file = tempfile::NamedTempFile::new().expect("temp file");
    write!(user_id_file, "host-user-42").expect("write user id");

    rt.block_on(async {
        Mock::given(method("POST"))
            .and(path("/v1/auth/app-id/login"))
            .respond_with(ResponseTemplate::new(502))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/auth/app-id/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "auth": {"client_token": "s.issued"}
            })))
            .expect(1)
            .mount(&server)
            .await;
    });

    let config = test_config(&server.uri()).with_app_id("my-app", user_id_file.path());
    Session::authenticate(&config).expect("session");

    rt.block_on(server.verify());
}

#[test]
fn invalid_config_fails_before_any_request() {
    let rt = runtime();
    let server = rt.block_on(MockServer::start());

    let config = test_config(&server.uri());
    let err = Session::authenticate(&config).expect_err("should fail");

    assert!(matches!(err, AuthError::Config(_)));
    let requests = rt.block_on(server.received_requests()).unwrap_or_default();
    assert!(requests.is_empty());
}
