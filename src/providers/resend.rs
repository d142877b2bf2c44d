//! Resend API provider.
//!
//! # Example
//!
//! ```rust,ignore
//! use resend_relay::providers::ResendMailer;
//! use resend_relay::{Mailer, MailMessage, Settings};
//!
//! let mailer = ResendMailer::new();
//! let settings = Settings::new("re_xxxxx", "noreply@acme.test", "Acme");
//! let message = MailMessage::new("user@example.com")
//!     .subject("Welcome")
//!     .html("<p>Hello</p>");
//!
//! mailer.deliver(&settings, &message).await?;
//! ```
//!
//! ## Errors
//!
//! A non-2xx answer becomes [`MailError::Api`] with the provider's `error`
//! field (or "Unknown error"). A request that never got an answer becomes
//! [`MailError::Transport`]. Nothing is retried.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;
use std::time::Duration;
use tracing::Instrument;

use crate::error::MailError;
use crate::mailer::{DeliveryResult, Mailer};
use crate::message::MailMessage;
use crate::settings::Settings;

const RESEND_API_URL: &str = "https://api.resend.com";

/// Every provider call gives up after this long.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

const UNKNOWN_ERROR: &str = "Unknown error";

/// Resend API relay.
///
/// Holds no credentials: the API key and sender come from the [`Settings`]
/// passed to each call.
#[derive(Debug, Clone)]
pub struct ResendMailer {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl ResendMailer {
    /// Create a new Resend mailer pointed at the public API.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: RESEND_API_URL.to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Create with a custom reqwest client.
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            base_url: RESEND_API_URL.to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Create a mailer honouring `RESEND_BASE_URL` when it is set.
    pub fn from_env() -> Self {
        match env::var("RESEND_BASE_URL") {
            Ok(url) if !url.is_empty() => Self::new().base_url(url),
            _ => Self::new(),
        }
    }

    /// Set a custom base URL (for testing).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the per-call timeout (defaults to [`REQUEST_TIMEOUT`]).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn build_request(settings: &Settings, message: &MailMessage) -> ResendRequest {
        ResendRequest {
            from: settings.sender().formatted(),
            to: message.to.clone(),
            subject: message.subject.clone(),
            html: message.html.clone(),
        }
    }

    async fn send(
        &self,
        settings: &Settings,
        message: &MailMessage,
    ) -> Result<DeliveryResult, MailError> {
        let request = Self::build_request(settings, message);

        let url = format!("{}/emails", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", settings.api_key))
            .header("Content-Type", "application/json")
            .header("User-Agent", format!("resend-relay/{}", crate::VERSION))
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await?;

        let status = response.status().as_u16();
        // The body is optional on both paths; a missing or non-JSON body is
        // treated as absent.
        let body: Option<Value> = response.json().await.ok();

        if (200..300).contains(&status) {
            let id = body
                .and_then(|b| serde_json::from_value::<ResendResponse>(b).ok())
                .and_then(|r| r.id);
            Ok(match id {
                Some(id) => DeliveryResult::with_id(status, id),
                None => DeliveryResult::new(status),
            })
        } else {
            Err(MailError::api(status, error_message(body.as_ref())))
        }
    }
}

impl Default for ResendMailer {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull the provider message out of an error body.
fn error_message(body: Option<&Value>) -> String {
    match body.and_then(|b| b.get("error")) {
        Some(Value::String(message)) => message.clone(),
        Some(Value::Object(details)) => details
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_ERROR)
            .to_string(),
        _ => UNKNOWN_ERROR.to_string(),
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn deliver(
        &self,
        settings: &Settings,
        message: &MailMessage,
    ) -> Result<DeliveryResult, MailError> {
        let span = tracing::info_span!(
            "resend.deliver",
            provider = self.provider_name(),
            to = %message.to,
            subject = %message.subject,
        );
        span.in_scope(|| tracing::debug!("Relaying email"));

        #[cfg(feature = "metrics")]
        let start = std::time::Instant::now();

        let result = self.send(settings, message).instrument(span.clone()).await;
        let _guard = span.enter();

        #[cfg(feature = "metrics")]
        {
            let duration = start.elapsed().as_secs_f64();
            let status = if result.is_ok() { "success" } else { "error" };
            metrics::counter!("resend_relay_emails_total", "provider" => "resend", "status" => status)
                .increment(1);
            metrics::histogram!("resend_relay_delivery_duration_seconds", "provider" => "resend")
                .record(duration);
        }

        match &result {
            Ok(r) => tracing::info!(status = r.status, message_id = ?r.message_id, "Email delivered"),
            Err(e) => tracing::error!(error = %e, "Email delivery failed"),
        }

        result
    }

    fn provider_name(&self) -> &'static str {
        "resend"
    }
}

// ============================================================================
// Resend API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ResendRequest {
    from: String,
    to: String,
    subject: String,
    html: String,
}

#[derive(Debug, Deserialize)]
struct ResendResponse {
    #[serde(default)]
    id: Option<String>,
}
