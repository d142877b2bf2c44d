//! # Resend Relay
//!
//! Store Resend credentials, send test emails, and route outgoing mail through
//! the Resend HTTP API when nothing else handles it.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use resend_relay::{install_fallback, send_mail, MemorySettingsStore, OutgoingMail};
//! use resend_relay::providers::ResendMailer;
//!
//! let store = Arc::new(MemorySettingsStore::from_env());
//! install_fallback(store, Arc::new(ResendMailer::from_env()));
//!
//! let sent = send_mail(OutgoingMail::new("user@example.com", "Welcome!", "<p>Hello</p>")).await;
//! ```
//!
//! ## Admin Actions
//!
//! ```rust,ignore
//! use resend_relay::{AdminActions, Caller, SaveSettingsRequest, TokenIssuer};
//!
//! let actions = AdminActions::new(store, mailer, TokenIssuer::generate()?);
//! let caller = Caller::admin(session_id);
//!
//! let token = actions.issue_token(Action::SaveSettings, &caller);
//! let response = actions.save_settings(
//!     &caller,
//!     SaveSettingsRequest::new("re_xxxxx", "noreply@example.com", "My App").security(token),
//! );
//! assert!(response.success);
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `RESEND_API_KEY` | Initial `apiKey` for [`MemorySettingsStore::from_env`] |
//! | `EMAIL_FROM` | Initial `fromEmail` |
//! | `EMAIL_FROM_NAME` | Initial `senderName` |
//! | `RESEND_BASE_URL` | API base URL for [`ResendMailer::from_env`](providers::ResendMailer::from_env) |
//!
//! ## Feature Flags
//!
//! - `admin-axum` - Axum router for the admin actions
//! - `metrics` - Prometheus-style metrics (counters/histograms)
//!
//! ## Metrics
//!
//! Enable `features = ["metrics"]` to emit:
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `resend_relay_emails_total` | Counter | provider, status | Relay calls made |
//! | `resend_relay_delivery_duration_seconds` | Histogram | provider | Relay call duration |
//!
//! Install a recorder (e.g., `metrics-exporter-prometheus`) in your app to collect them.

/// The version of the resend-relay crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod actions;
mod address;
mod auth;
mod error;
mod fallback;
mod mailer;
mod message;
mod settings;

pub mod providers;
pub mod validate;

#[cfg(feature = "admin-axum")]
pub mod routes;

// Re-exports
pub use actions::{
    ActionMessage, ActionResponse, AdminActions, SaveSettingsRequest, SettingsPage,
    TestEmailRequest, SETTINGS_SAVED, TEST_EMAIL_HTML, TEST_EMAIL_SENT, TEST_EMAIL_SUBJECT,
};
pub use address::Address;
pub use auth::{Action, Caller, Capability, TokenIssuer};
pub use error::MailError;
pub use fallback::{
    install_fallback, register_transport, reset_transport, send_mail, transport, FallbackMailer,
    MailTransport, TransportRegistry,
};
pub use mailer::{DeliveryResult, Mailer};
pub use message::{MailMessage, OutgoingMail, Recipients};
pub use settings::{FileSettingsStore, MemorySettingsStore, SettingKey, Settings, SettingsStore};
