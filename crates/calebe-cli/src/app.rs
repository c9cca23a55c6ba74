//! Application state for one CLI invocation.

use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{debug, warn};

use calebe_core::auth::{Navigation, Route, RouteGuard, SessionManager, SessionStore};
use calebe_core::models::User;
use calebe_core::{ApiClient, Config};

pub struct App {
    pub config: Config,
    pub session: SessionManager,
}

impl App {
    /// Load configuration, open the credential store and restore any saved session
    pub fn new(api_url: Option<String>) -> Result<Self> {
        let mut config = Config::load().context("Failed to load configuration")?;
        if let Some(url) = api_url {
            config.api_url = Some(url);
        }

        let backend = config.open_credential_store()?;
        let store = SessionStore::new(backend);
        let api = ApiClient::with_timeout(config.api_url()?, store, config.request_timeout())?;
        let session = SessionManager::new(api, config.login_policy.clone());

        let restored = session.initialize();
        debug!(signed = restored.signed(), "Session initialized");

        Ok(Self::from_parts(config, session))
    }

    pub fn from_parts(config: Config, session: SessionManager) -> Self {
        Self { config, session }
    }

    pub fn api(&self) -> &ApiClient {
        self.session.api()
    }

    /// Resolve navigation to `route` for the current session.
    ///
    /// Signed-out users are sent to sign-in; signed-in users must hold a
    /// role that may open the route.
    pub fn open(&self, route: Route) -> Result<Option<User>> {
        match RouteGuard::check(self.session.is_signed(), route) {
            Navigation::Redirect(_) => {
                bail!("Not signed in. Run `calebe login` first.")
            }
            Navigation::Render(route) => {
                let user = self.session.user();
                if let Some(user) = &user {
                    if !route.permits(user.role) {
                        bail!(
                            "{} users cannot open {}",
                            user.role.display_name(),
                            route
                        );
                    }
                }
                Ok(user)
            }
        }
    }

    /// Like [`App::open`] for routes that always need a signed-in user
    pub fn require(&self, route: Route) -> Result<User> {
        self.open(route)?
            .ok_or_else(|| anyhow::anyhow!("Not signed in. Run `calebe login` first."))
    }

    /// Team whose roster a command works on: the given one, or the leader's own
    pub fn roster_route(&self, team: Option<i64>) -> Result<Route> {
        let own = self.session.user().and_then(|u| u.team_id);
        match (team, own) {
            (Some(team), Some(own)) if team == own => Ok(Route::Members(team)),
            (Some(team), _) => Ok(Route::TeamMembers(team)),
            (None, Some(own)) => Ok(Route::Members(own)),
            (None, None) => bail!("No team given. Pass --team <id>."),
        }
    }

    /// Open a team roster, returning the team id and the acting user
    pub fn roster(&self, team: Option<i64>) -> Result<(i64, User)> {
        let route = self.roster_route(team)?;
        let team = match route {
            Route::Members(id) | Route::TeamMembers(id) => id,
            _ => bail!("{} is not a team roster", route),
        };
        Ok((team, self.require(route)?))
    }

    pub fn remember_email(&mut self, email: &str) {
        self.config.last_email = Some(email.to_string());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }

    /// Upload a local file into `folder` and return its URL
    pub async fn upload_file(&self, folder: &str, path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow::anyhow!("Invalid file name: {}", path.display()))?;
        let uploaded = self.api().upload(folder, file_name, bytes).await?;
        Ok(uploaded.url)
    }
}
