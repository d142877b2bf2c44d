//! Outgoing message types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// A message handed to the relay.
///
/// The sender is not part of the message: it comes from the stored settings
/// at send time.
///
/// ```
/// use resend_relay::MailMessage;
///
/// let message = MailMessage::new("user@example.com")
///     .subject("Hello")
///     .html("<p>Hi</p>");
/// assert_eq!(message.to, "user@example.com");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    /// Recipient, or several recipients joined with `,`
    pub to: String,
    /// Subject line
    pub subject: String,
    /// HTML body
    pub html: String,
}

impl MailMessage {
    /// Create a message for the given recipient(s).
    pub fn new(to: impl Into<Recipients>) -> Self {
        Self {
            to: to.into().joined(),
            ..Self::default()
        }
    }

    /// Set the subject line.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Set the HTML body.
    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.html = html.into();
        self
    }
}

/// One recipient or a list of recipients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    One(String),
    Many(Vec<String>),
}

impl Recipients {
    /// Collapse into a single `to` value, joining lists with `,`.
    pub fn joined(&self) -> String {
        match self {
            Recipients::One(to) => to.clone(),
            Recipients::Many(list) => list.join(","),
        }
    }

    /// Number of addresses given.
    pub fn len(&self) -> usize {
        match self {
            Recipients::One(_) => 1,
            Recipients::Many(list) => list.len(),
        }
    }

    /// Whether no address was given.
    pub fn is_empty(&self) -> bool {
        match self {
            Recipients::One(to) => to.is_empty(),
            Recipients::Many(list) => list.is_empty(),
        }
    }
}

impl From<&str> for Recipients {
    fn from(to: &str) -> Self {
        Recipients::One(to.to_string())
    }
}

impl From<String> for Recipients {
    fn from(to: String) -> Self {
        Recipients::One(to)
    }
}

impl From<Vec<String>> for Recipients {
    fn from(list: Vec<String>) -> Self {
        Recipients::Many(list)
    }
}

impl From<Vec<&str>> for Recipients {
    fn from(list: Vec<&str>) -> Self {
        Recipients::Many(list.into_iter().map(String::from).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Recipients {
    fn from(list: [&str; N]) -> Self {
        Recipients::Many(list.iter().map(|s| s.to_string()).collect())
    }
}

/// A request to the process-wide mail function.
///
/// Mirrors the classic `send(to, subject, message, headers, attachments)`
/// signature. Headers and attachments are carried for interface
/// compatibility; the fallback transport does not transmit them.
///
/// ```
/// use resend_relay::OutgoingMail;
///
/// let mail = OutgoingMail::new(["a@example.com", "b@example.com"], "Report", "<p>Done</p>")
///     .header("X-Priority", "1")
///     .attachment("/tmp/report.pdf");
/// assert_eq!(mail.to.joined(), "a@example.com,b@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    /// Recipient(s)
    pub to: Recipients,
    /// Subject line
    pub subject: String,
    /// Message body, sent as HTML
    pub message: String,
    /// Custom headers
    pub headers: HashMap<String, String>,
    /// Attachment paths
    pub attachments: Vec<PathBuf>,
}

impl OutgoingMail {
    /// Create a request with no headers and no attachments.
    pub fn new(
        to: impl Into<Recipients>,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            message: message.into(),
            headers: HashMap::new(),
            attachments: Vec::new(),
        }
    }

    /// Add a custom header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Add an attachment path.
    pub fn attachment(mut self, path: impl Into<PathBuf>) -> Self {
        self.attachments.push(path.into());
        self
    }

    /// The message the relay would send for this request.
    pub fn to_message(&self) -> MailMessage {
        MailMessage::new(self.to.clone())
            .subject(&self.subject)
            .html(&self.message)
    }
}
