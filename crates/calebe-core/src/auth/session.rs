use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

use super::credentials::{CredentialRecord, StoreError};
use super::store::{Session, SessionStore};
use crate::api::{ApiClient, ApiError};
use crate::forms::{Credentials, PasswordPayload};
use crate::models::{Role, User};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Access not permitted for role '{role}'")]
    AccessNotPermitted { role: Role },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Which roles may sign in to the panel.
///
/// Team members authenticate against the same endpoint as staff, so the
/// panel turns them away after the server has accepted their credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginPolicy {
    pub denied_roles: Vec<Role>,
}

impl Default for LoginPolicy {
    fn default() -> Self {
        Self {
            denied_roles: vec![Role::Member],
        }
    }
}

impl LoginPolicy {
    /// A policy that lets every role in
    pub fn allow_all() -> Self {
        Self {
            denied_roles: Vec::new(),
        }
    }

    pub fn permits(&self, role: Role) -> bool {
        !self.denied_roles.contains(&role)
    }
}

/// Sign-in, sign-out and current-session state for the rest of the application.
#[derive(Clone)]
pub struct SessionManager {
    api: ApiClient,
    policy: LoginPolicy,
}

impl SessionManager {
    pub fn new(api: ApiClient, policy: LoginPolicy) -> Self {
        Self { api, policy }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    fn store(&self) -> &SessionStore {
        self.api.store()
    }

    /// Rehydrate the session from persisted storage. No network call.
    ///
    /// An unreadable record leaves the session signed out.
    pub fn initialize(&self) -> Session {
        match self.store().load_persisted() {
            Ok(Some(record)) => {
                info!(user_id = record.user.id, role = %record.user.role, "Restored persisted session");
                self.store().restore(record);
            }
            Ok(None) => {
                info!("No persisted session");
            }
            Err(e) => {
                warn!(error = %e, "Failed to read persisted session, starting signed out");
            }
        }
        self.current()
    }

    /// Authenticate and, if the role is allowed, persist the new session.
    ///
    /// On any failure the previous session state is left as it was.
    pub async fn login(&self, credentials: &Credentials) -> Result<User, SessionError> {
        let response = self.api.login(credentials).await?;

        if !self.policy.permits(response.user.role) {
            warn!(user_id = response.user.id, role = %response.user.role, "Login refused by panel policy");
            return Err(SessionError::AccessNotPermitted {
                role: response.user.role,
            });
        }

        let user = response.user.clone();
        self.store().sign_in(CredentialRecord {
            token: response.token,
            user: response.user,
        })?;

        info!(user_id = user.id, role = %user.role, "Login successful");
        Ok(user)
    }

    /// End the session. Local state is cleared whatever the server answers.
    pub async fn logout(&self) -> Result<(), SessionError> {
        if let Err(e) = self.api.logout().await {
            warn!(error = %e, "Remote sign-out failed, clearing local session anyway");
        }
        self.store().clear()?;
        info!("Logged out");
        Ok(())
    }

    /// Ask the server to email password reset instructions
    pub async fn request_password_reset(&self, email: &str) -> Result<(), SessionError> {
        self.api.request_password_reset(email).await?;
        info!("Password reset requested");
        Ok(())
    }

    /// Complete a reset with the token and user id from the emailed link.
    ///
    /// Any stored session is discarded afterwards so the user signs in again.
    pub async fn complete_password_reset(
        &self,
        reset_token: &str,
        user_id: i64,
        payload: &PasswordPayload,
    ) -> Result<(), SessionError> {
        self.api.reset_password(reset_token, user_id, payload).await?;
        self.store().clear()?;
        info!(user_id, "Password reset completed");
        Ok(())
    }

    pub fn current(&self) -> Session {
        self.store().session()
    }

    pub fn is_signed(&self) -> bool {
        self.store().is_signed()
    }

    pub fn user(&self) -> Option<User> {
        self.store().session().user
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.store().subscribe()
    }
}
