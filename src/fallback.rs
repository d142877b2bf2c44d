//! Process-wide mail function and the Resend-backed fallback transport.
//!
//! A host keeps at most one [`MailTransport`]. The fallback is registered
//! with [`install_fallback`], which only takes effect when nothing is
//! registered yet: an existing transport is never replaced.
//!
//! ```rust,ignore
//! use resend_relay::{install_fallback, send_mail, MemorySettingsStore, OutgoingMail};
//! use resend_relay::providers::ResendMailer;
//!
//! // At startup
//! install_fallback(store.clone(), Arc::new(ResendMailer::from_env()));
//!
//! // Anywhere
//! let sent = send_mail(OutgoingMail::new("user@example.com", "Hi", "<p>Hello</p>")).await;
//! ```

use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::mailer::Mailer;
use crate::message::OutgoingMail;
use crate::settings::SettingsStore;
use crate::validate::is_complete;

/// A mail-sending entry point with a boolean contract.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Send one message. `true` iff it was handed off successfully.
    async fn send(&self, mail: &OutgoingMail) -> bool;

    /// Transport name (for logging/debugging).
    fn name(&self) -> &'static str {
        "unknown"
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Holds the active mail transport.
#[derive(Default)]
pub struct TransportRegistry {
    slot: RwLock<Option<Arc<dyn MailTransport>>>,
}

impl TransportRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    /// Register `transport` unless one is already present.
    ///
    /// Returns `true` if this call installed it.
    pub fn register_if_absent(&self, transport: Arc<dyn MailTransport>) -> bool {
        let mut guard = self.slot.write();
        if let Some(existing) = guard.as_ref() {
            tracing::debug!(
                existing = existing.name(),
                skipped = transport.name(),
                "Mail transport already registered"
            );
            return false;
        }
        tracing::debug!(transport = transport.name(), "Registered mail transport");
        *guard = Some(transport);
        true
    }

    /// The registered transport, if any.
    pub fn get(&self) -> Option<Arc<dyn MailTransport>> {
        self.slot.read().clone()
    }

    /// Whether a transport is registered.
    pub fn is_registered(&self) -> bool {
        self.slot.read().is_some()
    }

    /// Remove the registered transport (useful for tests).
    pub fn clear(&self) {
        *self.slot.write() = None;
    }

    /// Send through the registered transport. `false` when none is registered.
    pub async fn send(&self, mail: &OutgoingMail) -> bool {
        match self.get() {
            Some(transport) => transport.send(mail).await,
            None => {
                tracing::warn!("No mail transport registered");
                false
            }
        }
    }
}

/// Process-wide registry.
static TRANSPORT: TransportRegistry = TransportRegistry::new();

/// Register a transport process-wide unless one is already present.
pub fn register_transport(transport: Arc<dyn MailTransport>) -> bool {
    TRANSPORT.register_if_absent(transport)
}

/// The process-wide transport, if any.
pub fn transport() -> Option<Arc<dyn MailTransport>> {
    TRANSPORT.get()
}

/// Remove the process-wide transport (useful for tests).
pub fn reset_transport() {
    TRANSPORT.clear();
}

/// Register the Resend-backed fallback unless a transport already exists.
///
/// Returns `true` if the fallback was installed.
pub fn install_fallback(store: Arc<dyn SettingsStore>, mailer: Arc<dyn Mailer>) -> bool {
    register_transport(Arc::new(FallbackMailer::new(store, mailer)))
}

/// Send through the process-wide transport.
///
/// `false` when no transport is registered or the send fails.
pub async fn send_mail(mail: OutgoingMail) -> bool {
    TRANSPORT.send(&mail).await
}

// ============================================================================
// Fallback transport
// ============================================================================

/// Sends mail through the relay using the stored settings.
///
/// All failures collapse to `false`: incomplete settings, an unreachable
/// provider and a rejected request look the same to the caller. Custom
/// headers and attachments are accepted but not sent.
#[derive(Clone)]
pub struct FallbackMailer {
    store: Arc<dyn SettingsStore>,
    mailer: Arc<dyn Mailer>,
}

impl FallbackMailer {
    /// Create a fallback over the given store and relay.
    pub fn new(store: Arc<dyn SettingsStore>, mailer: Arc<dyn Mailer>) -> Self {
        Self { store, mailer }
    }
}

#[async_trait]
impl MailTransport for FallbackMailer {
    async fn send(&self, mail: &OutgoingMail) -> bool {
        let settings = match self.store.get() {
            Ok(settings) => settings,
            Err(e) => {
                tracing::error!(error = %e, "Could not load relay settings");
                return false;
            }
        };
        if !is_complete(&settings) {
            tracing::debug!("Relay settings incomplete, not sending");
            return false;
        }

        if !mail.headers.is_empty() || !mail.attachments.is_empty() {
            tracing::debug!(
                headers = mail.headers.len(),
                attachments = mail.attachments.len(),
                "Custom headers and attachments are not relayed"
            );
        }

        self.mailer
            .deliver(&settings, &mail.to_message())
            .await
            .is_ok()
    }

    fn name(&self) -> &'static str {
        "resend-fallback"
    }
}
