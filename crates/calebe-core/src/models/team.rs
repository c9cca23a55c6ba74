use serde::{Deserialize, Serialize};

use super::User;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct District {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "igrejas", default)]
    pub churches: Vec<Church>,
}

impl District {
    pub fn church(&self, church_id: i64) -> Option<&Church> {
        self.churches.iter().find(|c| c.id == church_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Church {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "distritoId", default)]
    pub district_id: Option<i64>,
    #[serde(rename = "distrito", default, skip_serializing_if = "Option::is_none")]
    pub district: Option<Box<District>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(rename = "igrejaId", default)]
    pub church_id: Option<i64>,
    #[serde(rename = "igreja", default)]
    pub church: Option<Church>,
    #[serde(rename = "membros", default)]
    pub members: Vec<User>,
}

impl Team {
    pub fn church_name(&self) -> &str {
        self.church.as_ref().map(|c| c.name.as_str()).unwrap_or("-")
    }

    pub fn district_name(&self) -> &str {
        self.church
            .as_ref()
            .and_then(|c| c.district.as_ref())
            .map(|d| d.name.as_str())
            .unwrap_or("-")
    }

    /// Instagram handle with a single leading `@`
    pub fn instagram_handle(&self) -> Option<String> {
        self.instagram
            .as_deref()
            .map(|h| h.trim().trim_start_matches('@'))
            .filter(|h| !h.is_empty())
            .map(|h| format!("@{}", h))
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}
