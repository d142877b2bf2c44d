//! Admin actions: save settings and send a test email.
//!
//! Both actions share the same preamble: the caller must hold
//! [`Capability::ManageOptions`] and present the token issued for that exact
//! action. Every step returns through `Result`, so a failed check ends the
//! action before anything else runs. The outcome is flattened into an
//! [`ActionResponse`] at the very end.
//!
//! ```rust,ignore
//! use resend_relay::{AdminActions, Caller, MemorySettingsStore, TokenIssuer};
//! use resend_relay::providers::ResendMailer;
//!
//! let actions = AdminActions::new(
//!     MemorySettingsStore::shared(),
//!     Arc::new(ResendMailer::new()),
//!     TokenIssuer::generate()?,
//! );
//!
//! let caller = Caller::admin(session_id);
//! let response = actions.send_test_email(&caller, request).await;
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::auth::{Action, Caller, Capability, TokenIssuer};
use crate::error::MailError;
use crate::mailer::Mailer;
use crate::message::MailMessage;
use crate::settings::{Settings, SettingsStore};
use crate::validate::{is_complete, is_valid_email, sanitize_email, sanitize_text};

/// Reported after a successful save.
pub const SETTINGS_SAVED: &str = "Settings saved successfully!";

/// Reported after a successful test send.
pub const TEST_EMAIL_SENT: &str = "Test email sent successfully!";

/// Subject of the test email.
pub const TEST_EMAIL_SUBJECT: &str = "Test Email from Resend Email Settings";

/// Body of the test email.
pub const TEST_EMAIL_HTML: &str = "<p>This is a test email sent via the Resend API.</p>";

// ============================================================================
// Requests and responses
// ============================================================================

/// Form fields of the save-settings action.
///
/// Unknown fields are rejected. A missing `security` token is accepted here
/// and fails the security check instead.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SaveSettingsRequest {
    pub api_key: String,
    pub from_email: String,
    pub sender_name: String,
    #[serde(default)]
    pub security: Option<String>,
}

impl SaveSettingsRequest {
    /// Build a request from raw field values.
    pub fn new(
        api_key: impl Into<String>,
        from_email: impl Into<String>,
        sender_name: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            from_email: from_email.into(),
            sender_name: sender_name.into(),
            security: None,
        }
    }

    /// Attach the anti-forgery token.
    pub fn security(mut self, token: impl Into<String>) -> Self {
        self.security = Some(token.into());
        self
    }
}

/// Form fields of the test-email action.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TestEmailRequest {
    pub test_email: String,
    #[serde(default)]
    pub security: Option<String>,
}

impl TestEmailRequest {
    /// Build a request for the given raw recipient.
    pub fn new(test_email: impl Into<String>) -> Self {
        Self {
            test_email: test_email.into(),
            security: None,
        }
    }

    /// Attach the anti-forgery token.
    pub fn security(mut self, token: impl Into<String>) -> Self {
        self.security = Some(token.into());
        self
    }
}

/// Uniform action result, serialized as `{success, data: {message}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    pub data: ActionMessage,
}

/// Payload of an [`ActionResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionMessage {
    pub message: String,
}

impl ActionResponse {
    /// A successful result.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: ActionMessage {
                message: message.into(),
            },
        }
    }

    /// A failed result.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: ActionMessage {
                message: message.into(),
            },
        }
    }

    /// The message shown to the operator.
    pub fn message(&self) -> &str {
        &self.data.message
    }
}

impl From<Result<&'static str, MailError>> for ActionResponse {
    fn from(result: Result<&'static str, MailError>) -> Self {
        match result {
            Ok(message) => Self::success(message),
            Err(err) => Self::failure(err.user_message()),
        }
    }
}

/// What the settings page needs to render: current values plus fresh tokens.
#[derive(Debug, Clone, Serialize)]
pub struct SettingsPage {
    #[serde(flatten)]
    pub settings: Settings,
    /// Token per action name (`save-settings`, `test-email`)
    pub tokens: BTreeMap<&'static str, String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// The two admin actions, wired to a settings store, a relay and a token
/// issuer.
#[derive(Clone)]
pub struct AdminActions {
    store: Arc<dyn SettingsStore>,
    mailer: Arc<dyn Mailer>,
    tokens: TokenIssuer,
}

impl AdminActions {
    /// Create the handlers.
    pub fn new(
        store: Arc<dyn SettingsStore>,
        mailer: Arc<dyn Mailer>,
        tokens: TokenIssuer,
    ) -> Self {
        Self {
            store,
            mailer,
            tokens,
        }
    }

    /// The settings store the actions write to.
    pub fn store(&self) -> &Arc<dyn SettingsStore> {
        &self.store
    }

    /// Issue the token a form must send back for `action`.
    pub fn issue_token(&self, action: Action, caller: &Caller) -> Option<String> {
        self.tokens.issue(action, caller)
    }

    /// Capability and anti-forgery check shared by both actions.
    pub fn authorize(
        &self,
        caller: &Caller,
        action: Action,
        token: Option<&str>,
    ) -> Result<(), MailError> {
        let token_ok = token.is_some_and(|t| self.tokens.verify(action, caller, t));
        if !caller.can(Capability::ManageOptions) || !token_ok {
            tracing::warn!(action = %action, "Security check failed");
            return Err(MailError::SecurityCheckFailed);
        }
        Ok(())
    }

    /// Current settings and fresh tokens, for rendering the settings form.
    pub fn settings_page(&self, caller: &Caller) -> Result<SettingsPage, MailError> {
        if !caller.can(Capability::ManageOptions) {
            return Err(MailError::SecurityCheckFailed);
        }
        let settings = self.store.get()?;
        let tokens = Action::ALL
            .iter()
            .filter_map(|action| {
                self.tokens
                    .issue(*action, caller)
                    .map(|token| (action.as_str(), token))
            })
            .collect();
        Ok(SettingsPage { settings, tokens })
    }

    /// Sanitize and persist the three settings.
    ///
    /// Empty values are stored as empty; `fromEmail` is canonicalized but not
    /// required to be valid.
    pub fn save_settings(&self, caller: &Caller, request: SaveSettingsRequest) -> ActionResponse {
        self.try_save_settings(caller, request).into()
    }

    fn try_save_settings(
        &self,
        caller: &Caller,
        request: SaveSettingsRequest,
    ) -> Result<&'static str, MailError> {
        self.authorize(caller, Action::SaveSettings, request.security.as_deref())?;

        let settings = Settings::new(
            sanitize_text(&request.api_key),
            sanitize_email(&request.from_email),
            sanitize_text(&request.sender_name),
        );
        self.store.set(&settings).map_err(|e| {
            tracing::error!(error = %e, "Failed to save settings");
            e
        })?;

        tracing::info!(
            from_email = %settings.from_email,
            sender_name = %settings.sender_name,
            complete = settings.is_complete(),
            "Settings saved"
        );
        Ok(SETTINGS_SAVED)
    }

    /// Send the fixed test message to the given address.
    pub async fn send_test_email(
        &self,
        caller: &Caller,
        request: TestEmailRequest,
    ) -> ActionResponse {
        self.try_send_test_email(caller, request).await.into()
    }

    async fn try_send_test_email(
        &self,
        caller: &Caller,
        request: TestEmailRequest,
    ) -> Result<&'static str, MailError> {
        self.authorize(caller, Action::TestEmail, request.security.as_deref())?;

        let test_email = sanitize_email(&request.test_email);
        if test_email.is_empty() || !is_valid_email(&test_email) {
            tracing::warn!("Test email rejected: invalid address");
            return Err(MailError::InvalidAddress);
        }

        let settings = self.store.get()?;
        if !is_complete(&settings) {
            tracing::warn!("Test email rejected: settings incomplete");
            return Err(MailError::NotConfigured);
        }

        let message = MailMessage::new(test_email)
            .subject(TEST_EMAIL_SUBJECT)
            .html(TEST_EMAIL_HTML);
        self.mailer.deliver(&settings, &message).await?;

        Ok(TEST_EMAIL_SENT)
    }
}
