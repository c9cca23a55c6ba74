//! Authentication module for managing the panel session.
//!
//! This module provides:
//! - `CredentialStore`: persistence of the token + user record (file, keychain, memory)
//! - `SessionStore`: the shared, observable current session
//! - `SessionManager`: initialize / login / logout
//! - `RouteGuard`: redirects signed-out navigation to the sign-in route
//!
//! Token and user are persisted together as one record, so a single write
//! or clear never leaves one without the other.

pub mod credentials;
pub mod guard;
pub mod session;
pub mod store;

pub use credentials::{
    CredentialRecord, CredentialStore, FileCredentialStore, KeyringCredentialStore,
    MemoryCredentialStore, StoreError,
};
pub use guard::{menu_for, MenuEntry, MenuItem, Navigation, Route, RouteGuard};
pub use session::{LoginPolicy, SessionError, SessionManager};
pub use store::{Session, SessionStore};
