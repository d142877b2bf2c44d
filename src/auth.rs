//! Caller capabilities and per-action anti-forgery tokens.
//!
//! The host resolves who is calling and whether they hold the administrative
//! capability; this module only consumes that answer. Tokens are bound to an
//! action and a session:
//!
//! ```text
//! token = hex(HMAC-SHA256(key, "{tick}|{action}|{session}"))
//! ```
//!
//! The tick advances every 12 hours and a token is accepted during its own
//! tick and the following one, so a token lives between 12 and 24 hours.

use chrono::{DateTime, Utc};
use ring::hmac;
use ring::rand::SystemRandom;
use std::fmt;

use crate::error::MailError;

/// Length of one token tick.
const TICK_SECS: i64 = 12 * 60 * 60;

/// Privileges the host can grant to a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// May read and change the relay settings.
    ManageOptions,
}

/// The authenticated identity behind a request, as resolved by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller {
    session: Option<String>,
    capabilities: Vec<Capability>,
}

impl Caller {
    /// A caller holding [`Capability::ManageOptions`].
    pub fn admin(session: impl Into<String>) -> Self {
        Self {
            session: Some(session.into()),
            capabilities: vec![Capability::ManageOptions],
        }
    }

    /// A signed-in caller without administrative privileges.
    pub fn user(session: impl Into<String>) -> Self {
        Self {
            session: Some(session.into()),
            capabilities: Vec::new(),
        }
    }

    /// A caller with no session at all.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Grant an additional capability.
    pub fn with_capability(mut self, capability: Capability) -> Self {
        if !self.capabilities.contains(&capability) {
            self.capabilities.push(capability);
        }
        self
    }

    /// Whether the caller holds `capability`.
    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Session identifier tokens are bound to.
    pub fn session(&self) -> Option<&str> {
        self.session.as_deref()
    }
}

/// The two protected operations. Tokens for one never verify for the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    SaveSettings,
    TestEmail,
}

impl Action {
    /// All actions.
    pub const ALL: [Action; 2] = [Action::SaveSettings, Action::TestEmail];

    /// Token action name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::SaveSettings => "save-settings",
            Action::TestEmail => "test-email",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issues and verifies anti-forgery tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    key: hmac::Key,
}

impl TokenIssuer {
    /// Create an issuer from a fixed secret.
    ///
    /// Use a secret that survives restarts if tokens must stay valid across
    /// them.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, secret),
        }
    }

    /// Create an issuer with a random key. Tokens die with the process.
    pub fn generate() -> Result<Self, MailError> {
        let rng = SystemRandom::new();
        let key = hmac::Key::generate(hmac::HMAC_SHA256, &rng).map_err(|_| {
            MailError::Configuration("failed to generate token key".into())
        })?;
        Ok(Self { key })
    }

    /// Issue a token for `action`. Anonymous callers get none.
    pub fn issue(&self, action: Action, caller: &Caller) -> Option<String> {
        self.issue_at(action, caller, Utc::now())
    }

    /// Issue a token as of `now`.
    pub fn issue_at(&self, action: Action, caller: &Caller, now: DateTime<Utc>) -> Option<String> {
        let session = caller.session()?;
        let tag = hmac::sign(&self.key, signing_input(tick(now), action, session).as_bytes());
        Some(hex::encode(tag.as_ref()))
    }

    /// Check `token` against `action` and the caller's session.
    pub fn verify(&self, action: Action, caller: &Caller, token: &str) -> bool {
        self.verify_at(action, caller, token, Utc::now())
    }

    /// Check `token` as of `now`.
    pub fn verify_at(
        &self,
        action: Action,
        caller: &Caller,
        token: &str,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(session) = caller.session() else {
            return false;
        };
        let Ok(tag) = hex::decode(token) else {
            return false;
        };

        let current = tick(now);
        [current, current - 1].into_iter().any(|t| {
            hmac::verify(&self.key, signing_input(t, action, session).as_bytes(), &tag).is_ok()
        })
    }
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer").finish_non_exhaustive()
    }
}

fn tick(now: DateTime<Utc>) -> i64 {
    now.timestamp().div_euclid(TICK_SECS)
}

fn signing_input(tick: i64, action: Action, session: &str) -> String {
    format!("{}|{}|{}", tick, action.as_str(), session)
}
