//! Route table and the guard that keeps signed-out users on the sign-in page.

use crate::models::{Role, User};

/// Navigable views of the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    SignIn,
    /// Password reset link: one-time token and user id
    PasswordReset { token: String, user_id: i64 },
    TeamRegistration,
    Home,
    Teams,
    /// A team's roster as seen by pastors and admins
    TeamMembers(i64),
    /// A leader's own roster
    Members(i64),
    Challenges,
    Devotionals,
    /// Submissions to one challenge
    Responses(i64),
}

impl Route {
    /// Parse a path such as `/equipes/4` into a route
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let id = |s: &str| s.parse::<i64>().ok();

        match segments.as_slice() {
            [] => Some(Route::SignIn),
            ["recuperar", token, user_id] => Some(Route::PasswordReset {
                token: token.to_string(),
                user_id: id(*user_id)?,
            }),
            ["cadastro_equipe"] => Some(Route::TeamRegistration),
            ["home"] => Some(Route::Home),
            ["equipes"] => Some(Route::Teams),
            ["equipes", team] => Some(Route::TeamMembers(id(*team)?)),
            ["membros", team] => Some(Route::Members(id(*team)?)),
            ["desafios"] => Some(Route::Challenges),
            ["devocionais"] => Some(Route::Devotionals),
            ["respostas", challenge] => Some(Route::Responses(id(*challenge)?)),
            _ => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::SignIn => "/".to_string(),
            Route::PasswordReset { token, user_id } => format!("/recuperar/{}/{}", token, user_id),
            Route::TeamRegistration => "/cadastro_equipe".to_string(),
            Route::Home => "/home".to_string(),
            Route::Teams => "/equipes".to_string(),
            Route::TeamMembers(team) => format!("/equipes/{}", team),
            Route::Members(team) => format!("/membros/{}", team),
            Route::Challenges => "/desafios".to_string(),
            Route::Devotionals => "/devocionais".to_string(),
            Route::Responses(challenge) => format!("/respostas/{}", challenge),
        }
    }

    /// Routes reachable without signing in
    pub fn is_public(&self) -> bool {
        matches!(
            self,
            Route::SignIn | Route::PasswordReset { .. } | Route::TeamRegistration
        )
    }

    /// Whether a signed-in user with `role` may open this route.
    ///
    /// Mirrors which menu entries the panel enables for each role.
    pub fn permits(&self, role: Role) -> bool {
        match self {
            Route::SignIn | Route::PasswordReset { .. } | Route::TeamRegistration | Route::Home => true,
            Route::Teams | Route::TeamMembers(_) | Route::Challenges | Route::Devotionals | Route::Responses(_) => {
                role.is_manager()
            }
            Route::Members(_) => role == Role::Leader || role.is_manager(),
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Outcome of a navigation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirect(Route),
}

pub struct RouteGuard;

impl RouteGuard {
    /// Render protected routes only when signed in; otherwise send to sign-in.
    pub fn check(signed: bool, route: Route) -> Navigation {
        if route.is_public() || signed {
            Navigation::Render(route)
        } else {
            Navigation::Redirect(Route::SignIn)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Teams,
    MyTeam,
    Challenges,
    Devotionals,
    SignOut,
}

impl MenuItem {
    pub fn label(&self) -> &'static str {
        match self {
            MenuItem::Teams => "Teams",
            MenuItem::MyTeam => "Members",
            MenuItem::Challenges => "Challenges",
            MenuItem::Devotionals => "Devotionals",
            MenuItem::SignOut => "Sign out",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub item: MenuItem,
    pub route: Option<Route>,
    pub enabled: bool,
}

/// Side menu for a signed-in user.
///
/// Content entries are shown to everyone but only enabled for managers;
/// the "my team" entry only exists for leaders.
pub fn menu_for(user: &User) -> Vec<MenuEntry> {
    let manager = user.role.is_manager();
    let mut entries = vec![MenuEntry {
        item: MenuItem::Teams,
        route: Some(Route::Teams),
        enabled: manager,
    }];

    if user.role == Role::Leader {
        if let Some(team_id) = user.team_id {
            entries.push(MenuEntry {
                item: MenuItem::MyTeam,
                route: Some(Route::Members(team_id)),
                enabled: true,
            });
        }
    }

    entries.push(MenuEntry {
        item: MenuItem::Challenges,
        route: Some(Route::Challenges),
        enabled: manager,
    });
    entries.push(MenuEntry {
        item: MenuItem::Devotionals,
        route: Some(Route::Devotionals),
        enabled: manager,
    });
    entries.push(MenuEntry {
        item: MenuItem::SignOut,
        route: None,
        enabled: true,
    });
    entries
}
