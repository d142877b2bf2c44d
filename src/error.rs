//! Error types for resend-relay.

use thiserror::Error;

/// Errors that can occur while saving settings or relaying email.
#[derive(Debug, Clone, Error)]
pub enum MailError {
    /// Capability or anti-forgery check failed.
    #[error("Security check failed.")]
    SecurityCheckFailed,

    /// Recipient address is empty or not syntactically valid.
    #[error("Invalid email address.")]
    InvalidAddress,

    /// One or more of the provider settings is empty.
    #[error("Please configure Resend settings first.")]
    NotConfigured,

    /// The provider could not be reached (DNS, refused connection, timeout).
    #[error("{0}")]
    Transport(String),

    /// The provider answered with a non-2xx status.
    #[error("Provider error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Provider-supplied message, or "Unknown error"
        message: String,
    },

    /// Reading or writing the settings store failed.
    #[error("Settings storage error: {0}")]
    Storage(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(String),

    /// Configuration error (missing key material, invalid value, etc.)
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl MailError {
    /// Create an API error from a status code and provider message.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// The message shown to the operator at the action boundary.
    ///
    /// API failures are prefixed with `Failed to send: `; transport failures
    /// surface the underlying error text as-is.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } => format!("Failed to send: {}", message),
            other => other.to_string(),
        }
    }

    /// HTTP status returned by the provider, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this error came from the transport rather than the provider.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

// The cause (refused connection, DNS, timeout) is only in the source chain.
impl From<reqwest::Error> for MailError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(error_chain(&err))
    }
}

/// `err` followed by each of its sources, joined with `": "`.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

impl From<serde_json::Error> for MailError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<std::io::Error> for MailError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        assert_eq!(
            MailError::SecurityCheckFailed.user_message(),
            "Security check failed."
        );
        assert_eq!(
            MailError::InvalidAddress.user_message(),
            "Invalid email address."
        );
        assert_eq!(
            MailError::NotConfigured.user_message(),
            "Please configure Resend settings first."
        );
        assert_eq!(
            MailError::api(422, "invalid from").user_message(),
            "Failed to send: invalid from"
        );
        assert_eq!(
            MailError::Transport("connection refused".into()).user_message(),
            "connection refused"
        );
    }

    #[test]
    fn test_status_and_kind() {
        let api = MailError::api(500, "Unknown error");
        assert_eq!(api.status(), Some(500));
        assert!(!api.is_transport());

        let transport = MailError::Transport("timed out".into());
        assert_eq!(transport.status(), None);
        assert!(transport.is_transport());
    }

    #[derive(Debug, Error)]
    #[error("error sending request")]
    struct Outer(#[source] Inner);

    #[derive(Debug, Error)]
    #[error("tcp connect error")]
    struct Inner(#[source] std::io::Error);

    #[test]
    fn test_error_chain_includes_causes() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "Connection refused");
        let err = Outer(Inner(io));
        assert_eq!(
            error_chain(&err),
            "error sending request: tcp connect error: Connection refused"
        );
    }
}
