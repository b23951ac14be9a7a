//! Integration tests for seal operations.

use skribble::{
    Client, ClientConfig, CreateSealRequest, ErrorKind, Image, Position, VisualSignature,
};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PDF_B64: &str = "JVBERi0xLjQ=";

fn client_for(server: &MockServer) -> Client {
    Client::with_config(ClientConfig::with_access_token("test_token").base_url(server.uri())).unwrap()
}

#[tokio::test]
async fn test_create_seal_with_visual_signature() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/seal"))
        .and(body_json(serde_json::json!({
            "content": PDF_B64,
            "visual_signature": {
                "position": {"x": 20.0, "y": 20.0, "width": 260.0, "height": 120.0, "page": "0"},
                "image": {"content_type": "image/png", "content": "iVBORw0KGgo="}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "document_id": "sealed-1",
            "status": "SEALED"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let sealed = client
        .seals()
        .create(CreateSealRequest {
            content: PDF_B64.to_string(),
            visual_signature: Some(VisualSignature {
                position: Position {
                    x: 20.0,
                    y: 20.0,
                    width: 260.0,
                    height: 120.0,
                    page: "0".to_string(),
                    rotation: None,
                },
                image: Some(Image {
                    content_type: "image/png".to_string(),
                    content: "iVBORw0KGgo=".to_string(),
                }),
            }),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(sealed.document_id, "sealed-1");
    assert_eq!(sealed.status.as_deref(), Some("SEALED"));
}

#[tokio::test]
async fn test_create_specific_seal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/seal"))
        .and(body_json(serde_json::json!({
            "content": PDF_B64,
            "account_name": "company_seal_department_a"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "document_id": "sealed-2"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let sealed = client
        .seals()
        .create_specific(PDF_B64, Some("company_seal_department_a"))
        .await
        .unwrap();
    assert_eq!(sealed.document_id, "sealed-2");
}

#[tokio::test]
async fn test_seal_without_content_is_rejected() {
    let client = Client::with_access_token("test_token").unwrap();
    let err = client
        .seals()
        .create_specific("", None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.validation_errors()[0].field, "content");
}
