//! Sender address with display name.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An email address with an optional display name.
///
/// # Examples
///
/// ```
/// use resend_relay::Address;
///
/// let addr = Address::with_name("Acme", "noreply@acme.test");
/// assert_eq!(addr.formatted(), "Acme <noreply@acme.test>");
///
/// let addr = Address::new("noreply@acme.test");
/// assert_eq!(addr.formatted(), "noreply@acme.test");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Optional display name (e.g., "Acme Support")
    pub name: Option<String>,
    /// Email address (e.g., "support@acme.test")
    pub email: String,
}

impl Address {
    /// Create a new address with just an email.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            name: None,
            email: email.into(),
        }
    }

    /// Create a new address with a name and email.
    pub fn with_name(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: email.into(),
        }
    }

    /// Split into `(local, domain)` at the last `@`.
    pub fn split(email: &str) -> Option<(&str, &str)> {
        let at = email.rfind('@')?;
        Some((&email[..at], &email[at + 1..]))
    }

    /// Format as "Name <email>" or just "email" if no name.
    pub fn formatted(&self) -> String {
        match &self.name {
            Some(name) if name.is_empty() => self.email.clone(),
            Some(name) => format!("{} <{}>", name, self.email),
            None => self.email.clone(),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.formatted())
    }
}

impl From<&str> for Address {
    fn from(email: &str) -> Self {
        Address::new(email)
    }
}

impl From<(&str, &str)> for Address {
    fn from((name, email): (&str, &str)) -> Self {
        Address::with_name(name, email)
    }
}
