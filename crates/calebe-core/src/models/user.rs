use serde::{Deserialize, Serialize};

use super::Team;

/// Role of a platform user.
///
/// The wire values are the Portuguese role names the API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "pastor")]
    Pastor,
    #[serde(rename = "lider")]
    Leader,
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "membro")]
    Member,
}

impl Role {
    /// Wire value used by the API (`"lider"`, `"membro"`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Pastor => "pastor",
            Role::Leader => "lider",
            Role::Admin => "admin",
            Role::Member => "membro",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Pastor => "Pastor",
            Role::Leader => "Leader",
            Role::Admin => "Admin",
            Role::Member => "Member",
        }
    }

    /// Parse either the wire value or the English name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pastor" => Some(Role::Pastor),
            "lider" | "leader" => Some(Role::Leader),
            "admin" => Some(Role::Admin),
            "membro" | "member" => Some(Role::Member),
            _ => None,
        }
    }

    /// Pastors and admins manage teams and content for the whole platform.
    pub fn is_manager(&self) -> bool {
        matches!(self, Role::Pastor | Role::Admin)
    }

    /// Roles this role may assign when adding or editing a team member.
    pub fn assignable_roles(&self) -> Vec<Role> {
        let mut roles = vec![Role::Member, Role::Leader];
        if self.is_manager() {
            roles.push(Role::Pastor);
        }
        roles
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s).ok_or_else(|| format!("unknown role '{}'", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(rename = "nome", default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "perfil")]
    pub role: Role,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(rename = "equipeId", default)]
    pub team_id: Option<i64>,
    #[serde(rename = "equipe", default, skip_serializing_if = "Option::is_none")]
    pub team: Option<Box<Team>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
}

impl User {
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}
