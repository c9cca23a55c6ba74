use std::path::PathBuf;
use std::sync::Mutex;

use keyring::Entry;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::User;

/// Keychain service name for the keyring backend
const SERVICE_NAME: &str = "calebe-panel";

/// The single key the credential record is stored under
const RECORD_KEY: &str = "session";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Credential file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Credential record is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Keychain accepted the credential record but did not keep it")]
    NotPersisted,
}

/// Bearer token and the identity it belongs to, persisted as one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub token: String,
    pub user: User,
}

/// On-disk shape tolerating partially written records.
#[derive(Debug, Default, Deserialize)]
struct StoredRecord {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    user: Option<User>,
}

impl StoredRecord {
    fn into_record(self) -> Option<CredentialRecord> {
        match (self.token, self.user) {
            (Some(token), Some(user)) if !token.is_empty() => Some(CredentialRecord { token, user }),
            (None, None) => None,
            (token, user) => {
                warn!(
                    has_token = token.is_some(),
                    has_user = user.is_some(),
                    "Ignoring incomplete credential record"
                );
                None
            }
        }
    }
}

/// Decode a serialized record, treating partial records as absent.
pub fn decode_record(raw: &str) -> Result<Option<CredentialRecord>, StoreError> {
    let stored: StoredRecord = serde_json::from_str(raw)?;
    Ok(stored.into_record())
}

/// Key-value persistence for the credential record.
///
/// Token and user are always written and cleared together: implementations
/// store one serialized value under one key.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Option<CredentialRecord>, StoreError>;

    fn save(&self, record: &CredentialRecord) -> Result<(), StoreError>;

    fn clear(&self) -> Result<(), StoreError>;
}

/// Credential record kept in a JSON file.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<CredentialRecord>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)?;
        decode_record(&contents)
    }

    fn save(&self, record: &CredentialRecord) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(record)?;

        // Write beside the target and rename so readers never see half a record
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &self.path)?;
        debug!(path = ?self.path, "Credential record saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// Credential record kept in the OS keychain.
pub struct KeyringCredentialStore {
    service: String,
}

impl KeyringCredentialStore {
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    pub fn with_service(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }

    fn entry(&self) -> Result<Entry, StoreError> {
        Ok(Entry::new(&self.service, RECORD_KEY)?)
    }
}

impl Default for KeyringCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn load(&self) -> Result<Option<CredentialRecord>, StoreError> {
        match self.entry()?.get_password() {
            Ok(raw) => decode_record(&raw),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, record: &CredentialRecord) -> Result<(), StoreError> {
        let raw = serde_json::to_string(record)?;
        self.entry()?.set_password(&raw)?;

        // Read back through a fresh entry; a store that drops writes fails here
        match self.entry()?.get_password() {
            Ok(stored) if stored == raw => {
                debug!(service = %self.service, "Credential record saved to keychain");
                Ok(())
            }
            Ok(_) | Err(keyring::Error::NoEntry) => Err(StoreError::NotPersisted),
            Err(e) => Err(e.into()),
        }
    }

    fn clear(&self) -> Result<(), StoreError> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Credential record held in memory, for tests and embedders.
#[derive(Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an already serialized value under the record key
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(raw.into())),
        }
    }

    /// The serialized value currently stored, if any
    pub fn raw(&self) -> Option<String> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<CredentialRecord>, StoreError> {
        match self.raw() {
            Some(raw) => decode_record(&raw),
            None => Ok(None),
        }
    }

    fn save(&self, record: &CredentialRecord) -> Result<(), StoreError> {
        let raw = serde_json::to_string(record)?;
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(raw);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}
