//! Mailer trait and delivery result types.
//!
//! # Why `async_trait`?
//!
//! The action handlers and the fallback transport hold their relay as
//! `Arc<dyn Mailer>` so tests can swap in a recording mailer. Native async
//! trait methods are not object-safe, so the trait is declared with
//! `#[async_trait]` and pays one boxed future per send. Sends are dominated by
//! network latency, so the allocation does not show up.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::MailError;
use crate::message::MailMessage;
use crate::settings::Settings;

/// Result of a successful relay call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryResult {
    /// HTTP status returned by the provider
    pub status: u16,
    /// Message ID assigned by the provider, when it sent one back
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

impl DeliveryResult {
    /// Create a delivery result with just a status.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            message_id: None,
        }
    }

    /// Create a delivery result with a provider message ID.
    pub fn with_id(status: u16, message_id: impl Into<String>) -> Self {
        Self {
            status,
            message_id: Some(message_id.into()),
        }
    }
}

/// Relays one message using the given credentials.
///
/// Callers are responsible for passing complete settings; see
/// [`is_complete`](crate::validate::is_complete).
///
/// ```ignore
/// use resend_relay::{Mailer, MailMessage, Settings};
/// use resend_relay::providers::ResendMailer;
///
/// let mailer = ResendMailer::new();
/// let settings = Settings::new("re_123", "noreply@acme.test", "Acme");
/// let message = MailMessage::new("user@example.com").subject("Hi").html("<p>Hi</p>");
///
/// mailer.deliver(&settings, &message).await?;
/// ```
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send a single message. Exactly one attempt is made.
    async fn deliver(
        &self,
        settings: &Settings,
        message: &MailMessage,
    ) -> Result<DeliveryResult, MailError>;

    /// Get the provider name (for logging/debugging).
    fn provider_name(&self) -> &'static str {
        "unknown"
    }
}
