//! Local adapter tests.

use resend_relay::providers::LocalMailer;
use resend_relay::{MailError, MailMessage, Mailer, Settings};

fn settings() -> Settings {
    Settings::new("re_local", "tony.stark@example.com", "Tony Stark")
}

fn message(to: &str) -> MailMessage {
    MailMessage::new(to)
        .subject("Hello, Avengers!")
        .html("<p>Hello!</p>")
}

// ============================================================================
// Basic Delivery Tests
// ============================================================================

#[tokio::test]
async fn deliver_returns_ok() {
    let mailer = LocalMailer::new();

    let result = mailer
        .deliver(&settings(), &message("steve.rogers@example.com"))
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn captures_sent_emails() {
    let mailer = LocalMailer::new();

    mailer
        .deliver(&settings(), &message("steve.rogers@example.com"))
        .await
        .unwrap();
    mailer
        .deliver(&settings(), &message("natasha.romanoff@example.com"))
        .await
        .unwrap();

    assert_eq!(mailer.delivery_count(), 2);
    assert!(mailer.sent_to("steve.rogers@example.com"));
    assert!(mailer.sent_to("natasha.romanoff@example.com"));
    assert!(!mailer.sent_to("thor@example.com"));

    let deliveries = mailer.deliveries();
    assert_eq!(deliveries[0].message.to, "steve.rogers@example.com");
    assert_ne!(deliveries[0].id, deliveries[1].id);
}

#[tokio::test]
async fn records_credentials_used() {
    let mailer = LocalMailer::new();

    mailer
        .deliver(&settings(), &message("steve.rogers@example.com"))
        .await
        .unwrap();

    let recorded = mailer.last_delivery().unwrap();
    assert_eq!(recorded.api_key, "re_local");
    assert_eq!(recorded.from, "Tony Stark <tony.stark@example.com>");
}

// ============================================================================
// Failure Simulation Tests
// ============================================================================

#[tokio::test]
async fn simulated_api_failure() {
    let mailer = LocalMailer::new();
    mailer.set_api_failure(401, "API key is invalid");

    let err = mailer
        .deliver(&settings(), &message("steve.rogers@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, MailError::Api { status: 401, .. }));
    assert_eq!(err.user_message(), "Failed to send: API key is invalid");

    assert_eq!(mailer.attempt_count(), 1);
    assert_eq!(mailer.delivery_count(), 0);
}

#[tokio::test]
async fn simulated_transport_failure() {
    let mailer = LocalMailer::new();
    mailer.set_transport_failure("operation timed out");

    let err = mailer
        .deliver(&settings(), &message("steve.rogers@example.com"))
        .await
        .unwrap_err();
    assert!(err.is_transport());
    assert_eq!(err.user_message(), "operation timed out");
}
