//! Local mailer for development and testing.
//!
//! Records every relay call in memory instead of contacting the provider, so
//! tests can assert on what would have been sent (or that nothing was).
//!
//! ```rust,ignore
//! use resend_relay::providers::LocalMailer;
//!
//! let mailer = LocalMailer::new();
//! let actions = AdminActions::new(store, Arc::new(mailer.clone()), tokens);
//!
//! actions.send_test_email(&caller, request).await;
//! assert_eq!(mailer.delivery_count(), 0);
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

use crate::error::MailError;
use crate::mailer::{DeliveryResult, Mailer};
use crate::message::MailMessage;
use crate::settings::Settings;

/// A relay call captured by [`LocalMailer`].
#[derive(Debug, Clone)]
pub struct RecordedDelivery {
    /// Provider-style message ID
    pub id: String,
    /// The `from` value the provider would have received
    pub from: String,
    /// API key the call was made with
    pub api_key: String,
    /// The relayed message
    pub message: MailMessage,
    /// When the call was made
    pub sent_at: DateTime<Utc>,
}

/// How a simulated call should fail.
#[derive(Debug, Clone)]
enum Failure {
    Transport(String),
    Api { status: u16, message: String },
}

/// Local mailer that records deliveries in memory.
///
/// Clones share the same record, so a clone handed to the code under test can
/// be inspected through the first handle.
#[derive(Debug, Clone, Default)]
pub struct LocalMailer {
    deliveries: Arc<RwLock<Vec<RecordedDelivery>>>,
    /// If set, deliver() returns this error (for testing error paths).
    fail_with: Arc<RwLock<Option<Failure>>>,
    /// Calls made, including failed ones.
    attempts: Arc<RwLock<usize>>,
}

impl LocalMailer {
    /// Create a new local mailer with an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Failure Simulation (for testing)
    // =========================================================================

    /// Make every call fail as if the provider could not be reached.
    pub fn set_transport_failure(&self, message: impl Into<String>) {
        *self.fail_with.write() = Some(Failure::Transport(message.into()));
    }

    /// Make every call fail as if the provider answered with `status`.
    pub fn set_api_failure(&self, status: u16, message: impl Into<String>) {
        *self.fail_with.write() = Some(Failure::Api {
            status,
            message: message.into(),
        });
    }

    /// Clear the failure state.
    pub fn clear_failure(&self) {
        *self.fail_with.write() = None;
    }

    // =========================================================================
    // Delivery Access (for testing assertions)
    // =========================================================================

    /// Successful deliveries, oldest first.
    pub fn deliveries(&self) -> Vec<RecordedDelivery> {
        self.deliveries.read().clone()
    }

    /// The most recent successful delivery.
    pub fn last_delivery(&self) -> Option<RecordedDelivery> {
        self.deliveries.read().last().cloned()
    }

    /// Number of successful deliveries.
    pub fn delivery_count(&self) -> usize {
        self.deliveries.read().len()
    }

    /// Number of calls made, successful or not.
    pub fn attempt_count(&self) -> usize {
        *self.attempts.read()
    }

    /// Check if a message was delivered to exactly this `to` value.
    pub fn sent_to(&self, to: &str) -> bool {
        self.deliveries
            .read()
            .iter()
            .any(|d| d.message.to.eq_ignore_ascii_case(to))
    }

    /// Forget all recorded calls.
    pub fn clear(&self) {
        self.deliveries.write().clear();
        *self.attempts.write() = 0;
    }
}

#[async_trait]
impl Mailer for LocalMailer {
    async fn deliver(
        &self,
        settings: &Settings,
        message: &MailMessage,
    ) -> Result<DeliveryResult, MailError> {
        *self.attempts.write() += 1;

        let failure = self.fail_with.read().clone();
        if let Some(failure) = failure {
            return Err(match failure {
                Failure::Transport(message) => MailError::Transport(message),
                Failure::Api { status, message } => MailError::api(status, message),
            });
        }

        let id = uuid::Uuid::new_v4().to_string();
        self.deliveries.write().push(RecordedDelivery {
            id: id.clone(),
            from: settings.sender().formatted(),
            api_key: settings.api_key.clone(),
            message: message.clone(),
            sent_at: Utc::now(),
        });

        Ok(DeliveryResult::with_id(200, id))
    }

    fn provider_name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings::new("re_123", "noreply@acme.test", "Acme")
    }

    #[tokio::test]
    async fn test_records_delivery() {
        let mailer = LocalMailer::new();
        let message = MailMessage::new("user@example.com").subject("Hello");

        let result = mailer.deliver(&settings(), &message).await.unwrap();
        assert_eq!(result.status, 200);
        assert!(result.message_id.is_some());

        let recorded = mailer.last_delivery().unwrap();
        assert_eq!(recorded.from, "Acme <noreply@acme.test>");
        assert_eq!(recorded.api_key, "re_123");
        assert_eq!(recorded.message.subject, "Hello");
        assert!(mailer.sent_to("user@example.com"));
    }

    #[tokio::test]
    async fn test_clone_shares_record() {
        let mailer = LocalMailer::new();
        let cloned = mailer.clone();

        cloned
            .deliver(&settings(), &MailMessage::new("a@example.com"))
            .await
            .unwrap();
        assert_eq!(mailer.delivery_count(), 1);
    }

    #[tokio::test]
    async fn test_can_fail() {
        let mailer = LocalMailer::new();
        let message = MailMessage::new("user@example.com");

        mailer.set_transport_failure("connection refused");
        let err = mailer.deliver(&settings(), &message).await.unwrap_err();
        assert!(err.is_transport());

        mailer.set_api_failure(422, "invalid from");
        let err = mailer.deliver(&settings(), &message).await.unwrap_err();
        assert_eq!(err.status(), Some(422));

        assert_eq!(mailer.attempt_count(), 2);
        assert_eq!(mailer.delivery_count(), 0);

        mailer.clear_failure();
        assert!(mailer.deliver(&settings(), &message).await.is_ok());
        assert_eq!(mailer.delivery_count(), 1);
    }

    #[tokio::test]
    async fn test_clear() {
        let mailer = LocalMailer::new();
        mailer
            .deliver(&settings(), &MailMessage::new("a@example.com"))
            .await
            .unwrap();

        mailer.clear();
        assert_eq!(mailer.delivery_count(), 0);
        assert_eq!(mailer.attempt_count(), 0);
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(LocalMailer::new().provider_name(), "local");
    }
}
