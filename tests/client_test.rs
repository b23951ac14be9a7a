//! Integration tests for authentication and request dispatch.

use skribble::{Client, ClientConfig, ErrorKind, Method, SkribbleError};
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentialed(server: &MockServer) -> Client {
    Client::with_config(ClientConfig::with_credentials("api_user", "api_key").base_url(server.uri()))
        .unwrap()
}

fn token_only(server: &MockServer, token: &str) -> Client {
    Client::with_config(ClientConfig::with_access_token(token).base_url(server.uri())).unwrap()
}

async fn mount_login(server: &MockServer, token: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path("/access/login"))
        .and(body_json(serde_json::json!({
            "username": "api_user",
            "api-key": "api_key"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string(token))
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_client_creation() {
    let client = Client::with_credentials("api_user", "api_key").unwrap();
    assert!(client.base_url().starts_with("https://"));
}

#[tokio::test]
async fn test_token_client_never_logs_in() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, "unused", 0).await;

    Mock::given(method("GET"))
        .and(path("/documents"))
        .and(header("Authorization", "Bearer pre-issued"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = token_only(&mock_server, "pre-issued");
    client.documents().list(None).await.unwrap();
    client.documents().list(None).await.unwrap();
}

#[tokio::test]
async fn test_token_client_keeps_token_after_401() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, "unused", 0).await;

    Mock::given(method("GET"))
        .and(path("/documents"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .mount(&mock_server)
        .await;

    let client = token_only(&mock_server, "expired");
    let err = client.documents().list(None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Api);
    assert_eq!(client.access_token().await.as_deref(), Some("expired"));
}

#[tokio::test]
async fn test_credentials_log_in_lazily_once() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, "minted-token", 1).await;

    Mock::given(method("GET"))
        .and(path("/documents"))
        .and(header("Authorization", "Bearer minted-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = credentialed(&mock_server);

    // Nothing is sent at construction time
    let received = mock_server.received_requests().await.unwrap();
    assert!(received.is_empty());
    assert!(!client.is_authenticated().await);

    client.documents().list(None).await.unwrap();
    client.documents().list(None).await.unwrap();
    assert_eq!(client.access_token().await.as_deref(), Some("minted-token"));
}

#[tokio::test]
async fn test_clones_share_the_session() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, "shared-token", 1).await;

    Mock::given(method("GET"))
        .and(path("/documents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&mock_server)
        .await;

    let client = credentialed(&mock_server);
    let other = client.clone();
    client.documents().list(None).await.unwrap();
    other.documents().list(None).await.unwrap();
    assert_eq!(other.access_token().await.as_deref(), Some("shared-token"));
}

#[tokio::test]
async fn test_concurrent_first_requests_log_in_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/access/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("slow-token")
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/documents"))
        .and(header("Authorization", "Bearer slow-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = credentialed(&mock_server);
    let third = client.clone();
    let first = client.documents();
    let second = client.clone().documents();
    let last = third.documents();
    let (a, b, c) = tokio::join!(first.list(None), second.list(None), last.list(None));
    a.unwrap();
    b.unwrap();
    c.unwrap();
    assert_eq!(third.access_token().await.as_deref(), Some("slow-token"));
}

#[tokio::test]
async fn test_init_with_credentials_returns_token() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, "\"quoted-token\"", 1).await;

    let (client, token) = Client::init(
        ClientConfig::with_credentials("api_user", "api_key").base_url(mock_server.uri()),
    )
    .await
    .unwrap();

    assert_eq!(token.as_deref(), Some("quoted-token"));
    assert!(client.is_authenticated().await);
}

#[tokio::test]
async fn test_init_with_token_returns_nothing() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, "unused", 0).await;

    let (client, token) =
        Client::init(ClientConfig::with_access_token("pre-issued").base_url(mock_server.uri()))
            .await
            .unwrap();

    assert!(token.is_none());
    assert_eq!(client.access_token().await.as_deref(), Some("pre-issued"));
}

#[tokio::test]
async fn test_login_401_is_auth_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/access/login"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&mock_server)
        .await;

    let client = credentialed(&mock_server);
    let result = client.documents().list(None).await;

    match result {
        Err(SkribbleError::Auth { status_code, .. }) => assert_eq!(status_code, Some(401)),
        other => panic!("Expected Auth error, got {:?}", other.map(|d| d.len())),
    }
}

#[tokio::test]
async fn test_login_server_error_is_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/access/login"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&mock_server)
        .await;

    let client = credentialed(&mock_server);
    let err = client.authenticate().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Api);
    assert_eq!(err.status_code(), Some(503));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_401_on_regular_call_is_api_error_and_forces_new_login() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, "fresh-token", 2).await;

    Mock::given(method("GET"))
        .and(path("/documents"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "message": "Token expired"
        })))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/documents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&mock_server)
        .await;

    let client = credentialed(&mock_server);

    let err = client.documents().list(None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Api);
    assert_eq!(err.status_code(), Some(401));
    assert_eq!(err.to_string(), "API error (401): Token expired");
    assert!(!client.is_authenticated().await);

    // Next call logs in again and succeeds
    let documents = client.documents().list(None).await.unwrap();
    assert!(documents.is_empty());
}

#[tokio::test]
async fn test_server_validation_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/documents"))
        .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
            "message": "Validation failed",
            "errors": [
                {"field": "content_type", "message": "unsupported content type"}
            ]
        })))
        .mount(&mock_server)
        .await;

    let client = token_only(&mock_server, "token");
    let err = client
        .documents()
        .add(skribble::CreateDocumentRequest::from_bytes("Doc", "text/plain", b"hi"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.status_code(), Some(422));
    assert_eq!(err.validation_errors()[0].field, "content_type");
}

#[tokio::test]
async fn test_api_error_carries_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/signature-requests/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "message": "Signature request not found"
        })))
        .mount(&mock_server)
        .await;

    let client = token_only(&mock_server, "token");
    let result = client.signature_requests().get("missing").await;

    match result {
        Err(SkribbleError::Api {
            message,
            status_code,
            body,
            ..
        }) => {
            assert_eq!(message, "Signature request not found");
            assert_eq!(status_code, Some(404));
            assert!(body.unwrap().contains("not found"));
        }
        _ => panic!("Expected Api error"),
    }
}

#[tokio::test]
async fn test_unexpected_payload_is_operation_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/documents/doc-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "title": "no id here"
        })))
        .mount(&mock_server)
        .await;

    let client = token_only(&mock_server, "token");
    let err = client.documents().get("doc-1").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Operation);
    assert_eq!(err.operation_name(), Some("get document"));
    assert!(std::error::Error::source(&err).is_some());
}

#[tokio::test]
async fn test_transport_failure_is_api_error() {
    // Nothing listens on port 1
    let client = Client::with_config(
        ClientConfig::with_access_token("token").base_url("http://127.0.0.1:1"),
    )
    .unwrap();

    let err = client.documents().list(None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Api);
    assert_eq!(err.status_code(), None);
    assert!(std::error::Error::source(&err).is_some());
}

#[tokio::test]
async fn test_raw_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/signature-requests/sr-1/remind"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/documents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{"id": "d"}])))
        .mount(&mock_server)
        .await;

    let client = token_only(&mock_server, "token");

    let empty = client
        .request::<()>(Method::POST, "/signature-requests/sr-1/remind", None)
        .await
        .unwrap();
    assert!(empty.is_null());

    let listed = client
        .request::<()>(Method::GET, "/documents", None)
        .await
        .unwrap();
    assert_eq!(listed[0]["id"], "d");
}
