//! Integration tests for `SessionAuthenticator` using wiremock HTTP mocks.

use std::time::Duration;

use promoscan_core::Credentials;
use promoscan_scraper::{
    build_http_client, FailureKind, Pacer, PacingBounds, ScraperError, SessionAuthenticator,
    SiteRoot,
};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LANDING: &str =
    "<html><script>var MERCHANTID = 42;\nvar MERCHANTNAME = 'Acme';</script></html>";

fn authenticator(timeout_secs: u64) -> SessionAuthenticator {
    let client = build_http_client(timeout_secs, "promoscan-test/0.1")
        .expect("client construction should not fail");
    SessionAuthenticator::new(client)
}

fn root(server: &MockServer) -> SiteRoot {
    SiteRoot::parse(&server.uri()).expect("mock server uri should parse")
}

fn credentials() -> Credentials {
    Credentials::new("0123456789", "hunter2")
}

async fn mount_landing(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_login(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/api/v1/index.php"))
        .and(body_string_contains("module=%2Fusers%2Flogin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn discover_extracts_merchant_from_landing_page() {
    let server = MockServer::start().await;
    mount_landing(&server, LANDING).await;

    let merchant = authenticator(5)
        .discover(&root(&server))
        .await
        .expect("discovery should succeed");

    assert_eq!(merchant.id, "42");
    assert_eq!(merchant.name, "Acme");
}

#[tokio::test]
async fn discover_without_pattern_is_discovery_failure() {
    let server = MockServer::start().await;
    mount_landing(&server, "<html><body>maintenance</body></html>").await;

    let err = authenticator(5)
        .discover(&root(&server))
        .await
        .expect_err("discovery should fail");

    assert!(
        matches!(err, ScraperError::DiscoveryFailed { .. }),
        "expected DiscoveryFailed, got: {err:?}"
    );
    assert_eq!(err.kind(), FailureKind::AuthDiscoveryFailed);
}

#[tokio::test]
async fn discover_empty_body_is_discovery_failure() {
    let server = MockServer::start().await;
    mount_landing(&server, "").await;

    let err = authenticator(5)
        .discover(&root(&server))
        .await
        .expect_err("discovery should fail");

    assert_eq!(err.kind(), FailureKind::AuthDiscoveryFailed);
}

#[tokio::test]
async fn discover_non_success_status_is_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = authenticator(5)
        .discover(&root(&server))
        .await
        .expect_err("discovery should fail");

    assert!(
        matches!(err, ScraperError::HttpStatus { status: 503, .. }),
        "expected HttpStatus 503, got: {err:?}"
    );
}

#[tokio::test]
async fn discover_times_out_on_slow_site() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(LANDING)
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let err = authenticator(1)
        .discover(&root(&server))
        .await
        .expect_err("discovery should time out");

    assert_eq!(err.kind(), FailureKind::NetworkTimeout);
}

#[tokio::test]
async fn login_sends_form_and_builds_credential() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/index.php"))
        .and(body_string_contains("module=%2Fusers%2Flogin"))
        .and(body_string_contains("mobile=0123456789"))
        .and(body_string_contains("password=hunter2"))
        .and(body_string_contains("merchantId=42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "SUCCESS",
            "data": { "id": 9001, "token": "tok-abc" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let auth = authenticator(5);
    let site = root(&server);
    let merchant = promoscan_scraper::MerchantInfo {
        id: "42".to_owned(),
        name: "Acme".to_owned(),
    };

    let credential = auth
        .login(&site, merchant, &credentials())
        .await
        .expect("login should succeed");

    assert_eq!(credential.merchant_id(), "42");
    assert_eq!(credential.merchant_name(), "Acme");
    assert_eq!(credential.access_id(), "9001");
    assert_eq!(credential.token(), "tok-abc");
    assert_eq!(
        credential.api_endpoint(),
        format!("{}/api/v1/index.php", server.uri())
    );
}

#[tokio::test]
async fn login_non_success_status_is_rejected() {
    let server = MockServer::start().await;
    mount_landing(&server, LANDING).await;
    mount_login(
        &server,
        serde_json::json!({ "status": "FAIL", "message": "wrong password" }),
    )
    .await;

    let pacer = Pacer::new(PacingBounds::none());
    let err = authenticator(5)
        .authenticate(&root(&server), &credentials(), &pacer)
        .await
        .expect_err("login should be rejected");

    assert!(
        matches!(&err, ScraperError::LoginRejected { status, .. } if status == "FAIL"),
        "expected LoginRejected, got: {err:?}"
    );
    assert_eq!(err.kind(), FailureKind::AuthCredentialRejected);
}

#[tokio::test]
async fn login_without_token_is_invalid_credential() {
    let server = MockServer::start().await;
    mount_landing(&server, LANDING).await;
    mount_login(
        &server,
        serde_json::json!({ "status": "SUCCESS", "data": { "id": "9001" } }),
    )
    .await;

    let pacer = Pacer::new(PacingBounds::none());
    let err = authenticator(5)
        .authenticate(&root(&server), &credentials(), &pacer)
        .await
        .expect_err("credential should be invalid");

    assert!(
        matches!(err, ScraperError::CredentialInvalid { field: "token" }),
        "expected CredentialInvalid(token), got: {err:?}"
    );
    assert_eq!(err.kind(), FailureKind::AuthDataInvalid);
}

#[tokio::test]
async fn login_html_body_is_malformed() {
    let server = MockServer::start().await;
    mount_landing(&server, LANDING).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/index.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let pacer = Pacer::new(PacingBounds::none());
    let err = authenticator(5)
        .authenticate(&root(&server), &credentials(), &pacer)
        .await
        .expect_err("body should be malformed");

    assert_eq!(err.kind(), FailureKind::MalformedResponseBody);
}

#[tokio::test]
async fn authenticate_paces_before_login() {
    let server = MockServer::start().await;
    mount_landing(&server, LANDING).await;
    mount_login(
        &server,
        serde_json::json!({ "status": "SUCCESS", "data": { "id": "7", "token": "t" } }),
    )
    .await;

    let pacer = Pacer::new(PacingBounds::none());
    let credential = authenticator(5)
        .authenticate(&root(&server), &credentials(), &pacer)
        .await
        .expect("authentication should succeed");

    assert_eq!(credential.access_id(), "7");
    assert_eq!(pacer.snapshot().await.len(), 1);
}
