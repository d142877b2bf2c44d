//! Resend adapter tests.

use std::time::Duration;

use resend_relay::providers::ResendMailer;
use resend_relay::{MailError, MailMessage, Mailer, Settings};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helper Functions
// ============================================================================

fn settings() -> Settings {
    Settings::new("re_123456789", "tony.stark@example.com", "Tony Stark")
}

fn valid_message() -> MailMessage {
    MailMessage::new("steve.rogers@example.com")
        .subject("Hello, Avengers!")
        .html("<h1>Hello</h1>")
}

// ============================================================================
// Basic Delivery Tests
// ============================================================================

#[tokio::test]
async fn successful_delivery_returns_ok() {
    let server = MockServer::start().await;
    let mailer = ResendMailer::new().base_url(server.uri());

    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(header("Authorization", "Bearer re_123456789"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({
            "from": "Tony Stark <tony.stark@example.com>",
            "to": "steve.rogers@example.com",
            "subject": "Hello, Avengers!",
            "html": "<h1>Hello</h1>"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "049b9217-30b5-4f61-a8e3-4d2d12f9f5a7"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = mailer.deliver(&settings(), &valid_message()).await.unwrap();
    assert_eq!(result.status, 200);
    assert_eq!(
        result.message_id.as_deref(),
        Some("049b9217-30b5-4f61-a8e3-4d2d12f9f5a7")
    );
}

#[tokio::test]
async fn any_2xx_is_success() {
    let server = MockServer::start().await;
    let mailer = ResendMailer::new().base_url(server.uri());

    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let result = mailer.deliver(&settings(), &valid_message()).await.unwrap();
    assert_eq!(result.status, 202);
    assert!(result.message_id.is_none());
}

#[tokio::test]
async fn trailing_slash_in_base_url_is_ignored() {
    let server = MockServer::start().await;
    let mailer = ResendMailer::new().base_url(format!("{}/", server.uri()));

    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "abc"})))
        .expect(1)
        .mount(&server)
        .await;

    assert!(mailer.deliver(&settings(), &valid_message()).await.is_ok());
}

#[tokio::test]
async fn multiple_recipients_are_sent_comma_joined() {
    let server = MockServer::start().await;
    let mailer = ResendMailer::new().base_url(server.uri());

    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(body_json(json!({
            "from": "Tony Stark <tony.stark@example.com>",
            "to": "a@example.com,b@example.com",
            "subject": "",
            "html": ""
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "abc"})))
        .expect(1)
        .mount(&server)
        .await;

    let message = MailMessage::new(["a@example.com", "b@example.com"]);
    assert!(mailer.deliver(&settings(), &message).await.is_ok());
}

// ============================================================================
// Error Handling Tests
// ============================================================================

#[tokio::test]
async fn api_error_uses_provider_message() {
    let server = MockServer::start().await;
    let mailer = ResendMailer::new().base_url(server.uri());

    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "error": "invalid from"
        })))
        .mount(&server)
        .await;

    let err = mailer
        .deliver(&settings(), &valid_message())
        .await
        .unwrap_err();
    match &err {
        MailError::Api { status, message } => {
            assert_eq!(*status, 422);
            assert_eq!(message, "invalid from");
        }
        other => panic!("Expected Api error, got {:?}", other),
    }
    assert_eq!(err.user_message(), "Failed to send: invalid from");
}

#[tokio::test]
async fn api_error_object_message() {
    let server = MockServer::start().await;
    let mailer = ResendMailer::new().base_url(server.uri());

    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"message": "API key is invalid"}
        })))
        .mount(&server)
        .await;

    let err = mailer
        .deliver(&settings(), &valid_message())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert_eq!(err.user_message(), "Failed to send: API key is invalid");
}

#[tokio::test]
async fn api_error_without_json_body_is_unknown() {
    let server = MockServer::start().await;
    let mailer = ResendMailer::new().base_url(server.uri());

    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let err = mailer
        .deliver(&settings(), &valid_message())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.user_message(), "Failed to send: Unknown error");
}

#[tokio::test]
async fn api_error_without_error_field_is_unknown() {
    let server = MockServer::start().await;
    let mailer = ResendMailer::new().base_url(server.uri());

    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "name": "validation_error"
        })))
        .mount(&server)
        .await;

    let err = mailer
        .deliver(&settings(), &valid_message())
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Failed to send: Unknown error");
}

#[tokio::test]
async fn unreachable_provider_is_transport_error() {
    let mailer = ResendMailer::new().base_url("http://127.0.0.1:1");

    let err = mailer
        .deliver(&settings(), &valid_message())
        .await
        .unwrap_err();
    assert!(err.is_transport(), "Expected Transport error, got {:?}", err);
    assert!(err.status().is_none());

    let message = err.user_message();
    assert!(!message.starts_with("Failed to send:"));
    assert!(
        message.to_lowercase().contains("refused"),
        "Expected the connection cause in {:?}",
        message
    );
}

#[tokio::test]
async fn slow_provider_times_out() {
    let server = MockServer::start().await;
    let mailer = ResendMailer::new()
        .base_url(server.uri())
        .timeout(Duration::from_millis(100));

    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": "late"}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let err = mailer
        .deliver(&settings(), &valid_message())
        .await
        .unwrap_err();
    assert!(err.is_transport(), "Expected Transport error, got {:?}", err);
    assert!(
        err.user_message().to_lowercase().contains("timed out"),
        "Expected a timeout cause in {:?}",
        err.user_message()
    );
}

#[test]
fn provider_name_is_resend() {
    assert_eq!(ResendMailer::new().provider_name(), "resend");
}
