use serde::{Deserialize, Serialize};

use super::User;

/// A challenge teams answer with photo or video submissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: i64,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "pontos", default)]
    pub points: Option<i64>,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub video: Option<String>,
    #[serde(rename = "conteudo", default)]
    pub content: Option<String>,
    /// ISO-8601 release timestamp
    #[serde(rename = "liberacao", default)]
    pub release: Option<String>,
    /// ISO-8601 closing timestamp
    #[serde(rename = "encerramento", default)]
    pub closing: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Devotional {
    pub id: i64,
    #[serde(rename = "autorId", default)]
    pub author_id: Option<i64>,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "verso", default)]
    pub verse: Option<String>,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub video: Option<String>,
    #[serde(rename = "conteudo", default)]
    pub content: Option<String>,
    #[serde(rename = "liberacao", default)]
    pub release: Option<String>,
    #[serde(rename = "autor", default)]
    pub author: Option<User>,
}

impl Devotional {
    /// Infer the content kind from which media fields are filled in.
    pub fn kind(&self) -> ContentKind {
        if self.video.as_deref().is_some_and(|v| !v.is_empty()) {
            ContentKind::Video
        } else if self.cover.as_deref().is_some_and(|c| !c.is_empty()) {
            ContentKind::Image
        } else {
            ContentKind::Text
        }
    }
}

/// Content-type selector for devotionals.
///
/// Decides which fields of the devotional form are shown and sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentKind {
    /// Text only: verse and body
    #[default]
    Text,
    /// Uploaded video, no verse or body
    Video,
    /// Cover image alongside verse and body
    Image,
}

impl ContentKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" | "nenhum" | "texto" => Some(ContentKind::Text),
            "video" => Some(ContentKind::Video),
            "image" | "imagem" => Some(ContentKind::Image),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContentKind::Text => "Text only",
            ContentKind::Video => "Video",
            ContentKind::Image => "Image",
        }
    }

    pub fn shows_text(&self) -> bool {
        !matches!(self, ContentKind::Video)
    }

    pub fn shows_video(&self) -> bool {
        matches!(self, ContentKind::Video)
    }

    pub fn shows_cover(&self) -> bool {
        matches!(self, ContentKind::Image)
    }
}

impl std::str::FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentKind::parse(s).ok_or_else(|| format!("unknown content type '{}'", s))
    }
}
