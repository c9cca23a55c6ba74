use serde::{Deserialize, Serialize};

use crate::utils::is_image_url;

/// A team's submission to a challenge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: i64,
    #[serde(rename = "aprovado", default)]
    pub approved: bool,
    #[serde(rename = "pontos", default)]
    pub points: Option<i64>,
    #[serde(rename = "observacao", default)]
    pub note: Option<String>,
    #[serde(rename = "respostas", default)]
    pub attachments: Vec<Attachment>,
}

impl Response {
    pub fn status_display(&self) -> &'static str {
        if self.approved {
            "Approved"
        } else {
            "Not approved yet"
        }
    }
}

/// One uploaded file belonging to a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(rename = "resposta")]
    pub url: String,
}

impl Attachment {
    pub fn is_image(&self) -> bool {
        is_image_url(&self.url)
    }
}

/// Row of the review table: a team together with its response to one challenge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamResponse {
    pub id: i64,
    #[serde(rename = "nome")]
    pub team_name: String,
    #[serde(default)]
    pub instagram: Option<String>,
    /// `None` while the team has not answered
    #[serde(rename = "resposta", default)]
    pub response: Option<Response>,
}
