//! Settings model and key/value stores.
//!
//! The provider credentials live in three independent entries (`apiKey`,
//! `fromEmail`, `senderName`). Stores persist each entry on its own; a save
//! that touches all three is three separate writes, and a concurrent reader
//! may observe a mix of old and new values.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::address::Address;
use crate::error::MailError;

/// Name of a persisted settings entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    ApiKey,
    FromEmail,
    SenderName,
}

impl SettingKey {
    /// All entries, in save order.
    pub const ALL: [SettingKey; 3] = [
        SettingKey::ApiKey,
        SettingKey::FromEmail,
        SettingKey::SenderName,
    ];

    /// Entry name in the backing store.
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::ApiKey => "apiKey",
            SettingKey::FromEmail => "fromEmail",
            SettingKey::SenderName => "senderName",
        }
    }

    /// Environment variable used to seed this entry.
    pub fn env_var(&self) -> &'static str {
        match self {
            SettingKey::ApiKey => "RESEND_API_KEY",
            SettingKey::FromEmail => "EMAIL_FROM",
            SettingKey::SenderName => "EMAIL_FROM_NAME",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider credentials and sender identity.
///
/// Unset fields are empty strings. The settings are usable only when all
/// three fields are non-empty, see [`is_complete`](crate::validate::is_complete).
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Bearer token for the provider
    pub api_key: String,
    /// Sender address
    pub from_email: String,
    /// Sender display name
    pub sender_name: String,
}

impl Settings {
    /// Create settings from the three field values.
    pub fn new(
        api_key: impl Into<String>,
        from_email: impl Into<String>,
        sender_name: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            from_email: from_email.into(),
            sender_name: sender_name.into(),
        }
    }

    /// Value of a single entry.
    pub fn field(&self, key: SettingKey) -> &str {
        match key {
            SettingKey::ApiKey => &self.api_key,
            SettingKey::FromEmail => &self.from_email,
            SettingKey::SenderName => &self.sender_name,
        }
    }

    fn field_mut(&mut self, key: SettingKey) -> &mut String {
        match key {
            SettingKey::ApiKey => &mut self.api_key,
            SettingKey::FromEmail => &mut self.from_email,
            SettingKey::SenderName => &mut self.sender_name,
        }
    }

    /// Whether all three fields are populated.
    pub fn is_complete(&self) -> bool {
        crate::validate::is_complete(self)
    }

    /// The `from` address used for outgoing mail.
    pub fn sender(&self) -> Address {
        Address::with_name(&self.sender_name, &self.from_email)
    }
}

// The API key never shows up in logs.
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field(
                "api_key",
                &if self.api_key.is_empty() { "" } else { "[redacted]" },
            )
            .field("from_email", &self.from_email)
            .field("sender_name", &self.sender_name)
            .finish()
    }
}

/// Key/value persistence for the settings entries.
///
/// Implementors provide single-entry reads and writes; [`get`](Self::get) and
/// [`set`](Self::set) are built on top of them. No validation happens here.
pub trait SettingsStore: Send + Sync {
    /// Read one entry. `None` if it was never written.
    fn entry(&self, key: SettingKey) -> Result<Option<String>, MailError>;

    /// Write one entry.
    fn put_entry(&self, key: SettingKey, value: &str) -> Result<(), MailError>;

    /// Load all settings, with empty strings for unset entries.
    fn get(&self) -> Result<Settings, MailError> {
        let mut settings = Settings::default();
        for key in SettingKey::ALL {
            if let Some(value) = self.entry(key)? {
                *settings.field_mut(key) = value;
            }
        }
        Ok(settings)
    }

    /// Write every field, one entry at a time.
    fn set(&self, settings: &Settings) -> Result<(), MailError> {
        for key in SettingKey::ALL {
            self.put_entry(key, settings.field(key))?;
        }
        Ok(())
    }
}

impl<S: SettingsStore + ?Sized> SettingsStore for Arc<S> {
    fn entry(&self, key: SettingKey) -> Result<Option<String>, MailError> {
        (**self).entry(key)
    }

    fn put_entry(&self, key: SettingKey, value: &str) -> Result<(), MailError> {
        (**self).put_entry(key, value)
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Thread-safe in-memory settings store.
///
/// Use for tests, or as the process-wide store when the host keeps its own
/// persistence elsewhere.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    entries: RwLock<HashMap<&'static str, String>>,
}

impl MemorySettingsStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store wrapped in an Arc for sharing.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Create a store pre-populated with the given settings.
    pub fn with_settings(settings: &Settings) -> Self {
        let store = Self::new();
        {
            let mut entries = store.entries.write();
            for key in SettingKey::ALL {
                entries.insert(key.as_str(), settings.field(key).to_string());
            }
        }
        store
    }

    /// Create a store seeded from `RESEND_API_KEY`, `EMAIL_FROM` and
    /// `EMAIL_FROM_NAME`. Variables that are not set leave their entry unset.
    pub fn from_env() -> Self {
        let store = Self::new();
        {
            let mut entries = store.entries.write();
            for key in SettingKey::ALL {
                if let Ok(value) = env::var(key.env_var()) {
                    tracing::debug!(entry = key.as_str(), "Seeded setting from environment");
                    entries.insert(key.as_str(), value);
                }
            }
        }
        store
    }
}

impl SettingsStore for MemorySettingsStore {
    fn entry(&self, key: SettingKey) -> Result<Option<String>, MailError> {
        Ok(self.entries.read().get(key.as_str()).cloned())
    }

    fn put_entry(&self, key: SettingKey, value: &str) -> Result<(), MailError> {
        self.entries.write().insert(key.as_str(), value.to_string());
        Ok(())
    }
}

// ============================================================================
// JSON file store
// ============================================================================

/// Settings store backed by a JSON object on disk.
///
/// Every [`put_entry`](SettingsStore::put_entry) is a read-modify-write of the
/// whole file. A missing file reads as "nothing set".
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    /// Create a store persisting to `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<HashMap<String, String>, MailError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(HashMap::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }
}

impl SettingsStore for FileSettingsStore {
    fn entry(&self, key: SettingKey) -> Result<Option<String>, MailError> {
        Ok(self.read_all()?.remove(key.as_str()))
    }

    fn put_entry(&self, key: SettingKey, value: &str) -> Result<(), MailError> {
        let mut entries = self.read_all()?;
        entries.insert(key.as_str().to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_reads_empty_strings() {
        let store = MemorySettingsStore::new();
        let settings = store.get().unwrap();
        assert_eq!(settings, Settings::default());
        assert!(!settings.is_complete());
    }

    #[test]
    fn test_set_then_get() {
        let store = MemorySettingsStore::new();
        let settings = Settings::new("re_123", "noreply@acme.test", "Acme");

        store.set(&settings).unwrap();
        assert_eq!(store.get().unwrap(), settings);
        assert_eq!(
            store.entry(SettingKey::FromEmail).unwrap().as_deref(),
            Some("noreply@acme.test")
        );
    }

    #[test]
    fn test_entries_are_independent() {
        let store = MemorySettingsStore::new();
        store.put_entry(SettingKey::SenderName, "Acme").unwrap();

        let settings = store.get().unwrap();
        assert_eq!(settings.sender_name, "Acme");
        assert_eq!(settings.api_key, "");
        assert_eq!(settings.from_email, "");
    }

    #[test]
    fn test_shared_store() {
        let store = MemorySettingsStore::shared();
        let other = Arc::clone(&store);

        other.put_entry(SettingKey::ApiKey, "re_abc").unwrap();
        assert_eq!(store.get().unwrap().api_key, "re_abc");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let settings = Settings::new("re_secret", "noreply@acme.test", "Acme");
        let debug = format!("{:?}", settings);
        assert!(!debug.contains("re_secret"));
        assert!(debug.contains("[redacted]"));
        assert!(debug.contains("noreply@acme.test"));
    }

    #[test]
    fn test_sender_address() {
        let settings = Settings::new("re_123", "noreply@acme.test", "Acme");
        assert_eq!(settings.sender().formatted(), "Acme <noreply@acme.test>");
    }

    #[test]
    fn test_key_names() {
        let names: Vec<_> = SettingKey::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["apiKey", "fromEmail", "senderName"]);
    }
}
