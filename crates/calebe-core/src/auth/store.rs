use std::sync::{Arc, RwLock};

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::credentials::{CredentialRecord, CredentialStore, StoreError};
use crate::models::User;

/// Authenticated state of this client as seen by the rest of the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Session {
    pub user: Option<User>,
}

impl Session {
    pub fn signed_in(user: User) -> Self {
        Self { user: Some(user) }
    }

    /// Signed in means a user record is present
    pub fn signed(&self) -> bool {
        self.user.is_some()
    }
}

struct Inner {
    backend: Box<dyn CredentialStore>,
    current: RwLock<Option<CredentialRecord>>,
    changes: watch::Sender<Session>,
}

/// Single source of truth for the current credentials.
///
/// Clone is cheap and every clone shares the same state. The HTTP client
/// reads the token from here on every request; the session manager writes
/// here on login and logout; anything else observes changes through
/// [`SessionStore::subscribe`].
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    pub fn new(backend: Box<dyn CredentialStore>) -> Self {
        let (changes, _) = watch::channel(Session::default());
        Self {
            inner: Arc::new(Inner {
                backend,
                current: RwLock::new(None),
                changes,
            }),
        }
    }

    /// Read the persisted record without changing the in-memory state
    pub fn load_persisted(&self) -> Result<Option<CredentialRecord>, StoreError> {
        self.inner.backend.load()
    }

    /// Current bearer token, if signed in
    pub fn token(&self) -> Option<String> {
        self.read().as_ref().map(|r| r.token.clone())
    }

    /// Current session snapshot
    pub fn session(&self) -> Session {
        Session {
            user: self.read().as_ref().map(|r| r.user.clone()),
        }
    }

    pub fn is_signed(&self) -> bool {
        self.read().is_some()
    }

    /// Receive every subsequent session change
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.changes.subscribe()
    }

    /// Adopt a record in memory only (used when rehydrating from storage)
    pub fn restore(&self, record: CredentialRecord) {
        self.replace(Some(record));
    }

    /// Persist a record and make it current
    pub fn sign_in(&self, record: CredentialRecord) -> Result<(), StoreError> {
        self.inner.backend.save(&record)?;
        self.replace(Some(record));
        Ok(())
    }

    /// Forget the current record in memory and in storage.
    ///
    /// The in-memory session is cleared even when the backend fails.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.replace(None);
        self.inner.backend.clear()
    }

    /// Clear after the server rejected our token; storage failures are logged
    pub fn invalidate(&self) {
        if let Err(e) = self.clear() {
            warn!(error = %e, "Failed to clear persisted credentials after unauthorized response");
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<CredentialRecord>> {
        self.inner.current.read().unwrap_or_else(|e| e.into_inner())
    }

    fn replace(&self, record: Option<CredentialRecord>) {
        let session = Session {
            user: record.as_ref().map(|r| r.user.clone()),
        };
        {
            let mut current = self.inner.current.write().unwrap_or_else(|e| e.into_inner());
            *current = record;
        }
        debug!(signed = session.signed(), "Session changed");
        self.inner.changes.send_replace(session);
    }
}
