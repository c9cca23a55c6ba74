use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use super::rules::is_complete_cpf;
use super::{non_blank, ValidationErrors, Validator};
use crate::models::{Challenge, ContentKind, Devotional, Role, User};
use crate::utils::{cpf_digits, is_disabled_release_date, parse_api_date, start_of_day};

/// Team member form, as filled in by a leader or a manager
#[derive(Debug, Clone, Default)]
pub struct MemberForm {
    pub name: String,
    pub email: String,
    pub cpf: String,
    pub role: Option<Role>,
}

/// Payload of `POST /usuario` and `PUT /usuario/:id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberPayload {
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    pub cpf: String,
    #[serde(rename = "perfil")]
    pub role: Role,
    #[serde(rename = "equipeId")]
    pub team_id: i64,
}

impl MemberForm {
    /// Prefill from an existing member for editing
    pub fn from_user(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            cpf: user.cpf.clone().unwrap_or_default(),
            role: Some(user.role),
        }
    }

    /// Validate and attach the member to `team_id`.
    ///
    /// `acting` is the role of the signed-in user; it bounds which roles
    /// may be assigned.
    pub fn into_payload(self, acting: Role, team_id: i64) -> Result<MemberPayload, ValidationErrors> {
        let name = self.name.trim().to_string();
        let email = self.email.trim().to_string();
        let cpf = cpf_digits(&self.cpf);
        let assignable = self.role.map(|r| acting.assignable_roles().contains(&r)).unwrap_or(true);

        let mut v = Validator::new();
        v.required("nome", &name, "Name is required")
            .required("email", &email, "Email is required")
            .email("email", &email, "Enter a valid email")
            .required("cpf", &cpf, "CPF is required")
            .check("cpf", is_complete_cpf(&cpf), "cpf", "CPF must have 11 digits")
            .required_some("perfil", &self.role, "Role is required")
            .check("perfil", assignable, "role", "You cannot assign this role");
        v.finish()?;

        let role = self
            .role
            .ok_or_else(|| ValidationErrors::missing("perfil", "Role is required"))?;
        Ok(MemberPayload {
            name,
            email,
            cpf,
            role,
            team_id,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChallengeForm {
    pub title: String,
    pub content: String,
    pub points: Option<i64>,
    pub video: Option<String>,
    pub cover: Option<String>,
    pub release: Option<NaiveDate>,
    pub closing: Option<NaiveDate>,
}

/// Payload of `POST /desafio` and `PUT /desafio/:id`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChallengePayload {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "conteudo")]
    pub content: String,
    #[serde(rename = "pontos", skip_serializing_if = "Option::is_none")]
    pub points: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(rename = "liberacao", skip_serializing_if = "Option::is_none")]
    pub release: Option<DateTime<Utc>>,
    #[serde(rename = "encerramento", skip_serializing_if = "Option::is_none")]
    pub closing: Option<DateTime<Utc>>,
}

impl ChallengeForm {
    pub fn from_challenge<Tz: TimeZone>(challenge: &Challenge, tz: &Tz) -> Self {
        Self {
            title: challenge.title.clone(),
            content: challenge.content.clone().unwrap_or_default(),
            points: challenge.points,
            video: challenge.video.clone(),
            cover: challenge.cover.clone(),
            release: challenge.release.as_deref().and_then(|d| parse_api_date(d, tz)),
            closing: challenge.closing.as_deref().and_then(|d| parse_api_date(d, tz)),
        }
    }

    pub fn into_payload<Tz: TimeZone>(self, tz: &Tz) -> Result<ChallengePayload, ValidationErrors> {
        let title = self.title.trim().to_string();
        let content = self.content.trim().to_string();
        let closes_after_release = match (self.release, self.closing) {
            (Some(release), Some(closing)) => closing >= release,
            _ => true,
        };

        let mut v = Validator::new();
        v.required("titulo", &title, "Title is required")
            .required("conteudo", &content, "Description is required")
            .non_negative("pontos", self.points, "Points must be zero or more")
            .check(
                "encerramento",
                closes_after_release,
                "date",
                "Closing date must not be before the release date",
            );
        v.finish()?;

        Ok(ChallengePayload {
            title,
            content,
            points: self.points,
            video: non_blank(&self.video),
            cover: non_blank(&self.cover),
            release: self.release.map(|d| start_of_day(d, tz)),
            closing: self.closing.map(|d| start_of_day(d, tz)),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct DevotionalForm {
    pub title: String,
    pub kind: ContentKind,
    pub verse: Option<String>,
    pub content: Option<String>,
    pub video: Option<String>,
    pub cover: Option<String>,
    pub release: Option<NaiveDate>,
}

/// Payload of `POST /devocional` and `PUT /devocional/:id`.
///
/// Fields hidden by the selected [`ContentKind`] are left out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DevotionalPayload {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "verso", skip_serializing_if = "Option::is_none")]
    pub verse: Option<String>,
    #[serde(rename = "conteudo", skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(rename = "liberacao")]
    pub release: DateTime<Utc>,
}

impl DevotionalForm {
    pub fn from_devotional<Tz: TimeZone>(devotional: &Devotional, tz: &Tz) -> Self {
        Self {
            title: devotional.title.clone(),
            kind: devotional.kind(),
            verse: devotional.verse.clone(),
            content: devotional.content.clone(),
            video: devotional.video.clone(),
            cover: devotional.cover.clone(),
            release: devotional.release.as_deref().and_then(|d| parse_api_date(d, tz)),
        }
    }

    /// Payload for a new devotional; past and current days in `now`'s zone cannot be released.
    pub fn into_new_payload<Tz: TimeZone>(self, now: &DateTime<Tz>) -> Result<DevotionalPayload, ValidationErrors> {
        let mut v = Validator::new();
        if let Some(release) = self.release {
            v.check(
                "liberacao",
                !is_disabled_release_date(release, now),
                "date",
                "Release date must be after today",
            );
        }
        self.build(v, &now.timezone())
    }

    /// Payload for an edit; an already released date is kept as is.
    pub fn into_payload<Tz: TimeZone>(self, tz: &Tz) -> Result<DevotionalPayload, ValidationErrors> {
        self.build(Validator::new(), tz)
    }

    fn build<Tz: TimeZone>(self, mut v: Validator, tz: &Tz) -> Result<DevotionalPayload, ValidationErrors> {
        let title = self.title.trim().to_string();
        let video = non_blank(&self.video);
        let cover = non_blank(&self.cover);

        v.required("titulo", &title, "Title is required")
            .required_some("liberacao", &self.release, "Release date is required");
        if self.kind.shows_video() {
            v.required_some("video", &video, "Upload a video");
        }
        if self.kind.shows_cover() {
            v.required_some("cover", &cover, "Upload a cover image");
        }
        v.finish()?;

        let release = self
            .release
            .ok_or_else(|| ValidationErrors::missing("liberacao", "Release date is required"))?;
        let text = self.kind.shows_text();
        Ok(DevotionalPayload {
            title,
            verse: non_blank(&self.verse).filter(|_| text),
            content: non_blank(&self.content).filter(|_| text),
            video: video.filter(|_| self.kind.shows_video()),
            cover: cover.filter(|_| self.kind.shows_cover()),
            release: start_of_day(release, tz),
        })
    }
}

/// Score given to a team's challenge submission
#[derive(Debug, Clone, Default)]
pub struct ReviewForm {
    pub points: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewPayload {
    #[serde(rename = "pontos")]
    pub points: i64,
}

impl ReviewForm {
    pub fn into_payload(self) -> Result<ReviewPayload, ValidationErrors> {
        let mut v = Validator::new();
        v.required_some("pontos", &self.points, "Points are required")
            .non_negative("pontos", self.points, "Points must be zero or more");
        v.finish()?;
        Ok(ReviewPayload {
            points: self.points.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn brasilia() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn member_form(role: Role) -> MemberForm {
        MemberForm {
            name: "João".to_string(),
            email: "joao@igreja.org".to_string(),
            cpf: "987.654.321-00".to_string(),
            role: Some(role),
        }
    }

    #[test]
    fn test_member_payload_shape() {
        let payload = member_form(Role::Member).into_payload(Role::Leader, 7).unwrap();
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "nome": "João",
                "email": "joao@igreja.org",
                "cpf": "98765432100",
                "perfil": "membro",
                "equipeId": 7
            })
        );
    }

    #[test]
    fn test_leader_cannot_assign_pastor() {
        let err = member_form(Role::Pastor).into_payload(Role::Leader, 7).unwrap_err();
        assert_eq!(err.message_for("perfil"), Some("You cannot assign this role"));

        assert!(member_form(Role::Pastor).into_payload(Role::Admin, 7).is_ok());
    }

    #[test]
    fn test_member_requires_fields() {
        let err = MemberForm::default().into_payload(Role::Admin, 1).unwrap_err();
        assert_eq!(err.message_for("nome"), Some("Name is required"));
        assert_eq!(err.message_for("cpf"), Some("CPF is required"));
        assert_eq!(err.message_for("perfil"), Some("Role is required"));
    }

    #[test]
    fn test_challenge_requires_title_and_description() {
        let err = ChallengeForm::default().into_payload(&Utc).unwrap_err();
        assert_eq!(err.message_for("titulo"), Some("Title is required"));
        assert_eq!(err.message_for("conteudo"), Some("Description is required"));
    }

    #[test]
    fn test_challenge_payload_dates_at_midnight() {
        let form = ChallengeForm {
            title: "Visite um asilo".to_string(),
            content: "Leve flores".to_string(),
            points: Some(50),
            video: Some("  ".to_string()),
            release: Some(date(2021, 5, 1)),
            closing: Some(date(2021, 5, 8)),
            ..Default::default()
        };
        let json = serde_json::to_value(form.into_payload(&brasilia()).unwrap()).unwrap();
        assert_eq!(json["pontos"], 50);
        assert_eq!(json["liberacao"], "2021-05-01T03:00:00Z");
        assert_eq!(json["encerramento"], "2021-05-08T03:00:00Z");
        assert!(json.get("video").is_none());
    }

    #[test]
    fn test_challenge_rejects_negative_points_and_inverted_dates() {
        let form = ChallengeForm {
            title: "t".to_string(),
            content: "c".to_string(),
            points: Some(-5),
            release: Some(date(2021, 5, 8)),
            closing: Some(date(2021, 5, 1)),
            ..Default::default()
        };
        let err = form.into_payload(&Utc).unwrap_err();
        assert!(err.message_for("pontos").is_some());
        assert!(err.message_for("encerramento").is_some());
    }

    #[test]
    fn test_challenge_form_from_existing() {
        let challenge: Challenge = serde_json::from_str(
            r#"{"id":3,"titulo":"Jejum","pontos":10,"conteudo":"Um dia","liberacao":"2021-05-01T03:00:00.000Z"}"#,
        )
        .unwrap();
        let form = ChallengeForm::from_challenge(&challenge, &brasilia());
        assert_eq!(form.release, Some(date(2021, 5, 1)));
        assert_eq!(form.closing, None);
        assert_eq!(form.content, "Um dia");
    }

    fn devotional_form(kind: ContentKind) -> DevotionalForm {
        DevotionalForm {
            title: "Salmo 23".to_string(),
            kind,
            verse: Some("O Senhor é o meu pastor".to_string()),
            content: Some("Reflexão".to_string()),
            video: Some("https://cdn/v.mp4".to_string()),
            cover: Some("https://cdn/c.png".to_string()),
            release: Some(date(2030, 1, 10)),
        }
    }

    #[test]
    fn test_video_devotional_drops_text_fields() {
        let json = serde_json::to_value(devotional_form(ContentKind::Video).into_payload(&Utc).unwrap()).unwrap();
        assert_eq!(json["video"], "https://cdn/v.mp4");
        assert!(json.get("verso").is_none());
        assert!(json.get("conteudo").is_none());
        assert!(json.get("cover").is_none());
    }

    #[test]
    fn test_image_devotional_sends_cover_and_text() {
        let json = serde_json::to_value(devotional_form(ContentKind::Image).into_payload(&Utc).unwrap()).unwrap();
        assert_eq!(json["cover"], "https://cdn/c.png");
        assert_eq!(json["verso"], "O Senhor é o meu pastor");
        assert!(json.get("video").is_none());
    }

    #[test]
    fn test_text_devotional_sends_only_text() {
        let json = serde_json::to_value(devotional_form(ContentKind::Text).into_payload(&Utc).unwrap()).unwrap();
        assert_eq!(json["conteudo"], "Reflexão");
        assert!(json.get("video").is_none());
        assert!(json.get("cover").is_none());
        assert_eq!(json["liberacao"], "2030-01-10T00:00:00Z");
    }

    #[test]
    fn test_new_devotional_rejects_today() {
        let now = Utc.with_ymd_and_hms(2030, 1, 10, 15, 0, 0).unwrap();
        let err = devotional_form(ContentKind::Text).into_new_payload(&now).unwrap_err();
        assert_eq!(err.message_for("liberacao"), Some("Release date must be after today"));

        let now = Utc.with_ymd_and_hms(2030, 1, 9, 23, 0, 0).unwrap();
        assert!(devotional_form(ContentKind::Text).into_new_payload(&now).is_ok());
    }

    #[test]
    fn test_new_devotional_uses_local_day() {
        // Late evening in Brasilia: tomorrow is still selectable
        let now = brasilia().with_ymd_and_hms(2030, 1, 9, 22, 0, 0).unwrap();
        let payload = devotional_form(ContentKind::Text).into_new_payload(&now).unwrap();
        assert_eq!(payload.release.to_rfc3339(), "2030-01-10T03:00:00+00:00");
    }

    #[test]
    fn test_devotional_requires_title_release_and_media() {
        let form = DevotionalForm {
            kind: ContentKind::Video,
            ..Default::default()
        };
        let err = form.into_payload(&Utc).unwrap_err();
        assert_eq!(err.message_for("titulo"), Some("Title is required"));
        assert_eq!(err.message_for("liberacao"), Some("Release date is required"));
        assert_eq!(err.message_for("video"), Some("Upload a video"));
    }

    #[test]
    fn test_review_payload() {
        let payload = ReviewForm { points: Some(30) }.into_payload().unwrap();
        assert_eq!(serde_json::to_value(payload).unwrap(), serde_json::json!({"pontos": 30}));
        assert!(ReviewForm { points: None }.into_payload().is_err());
        assert!(ReviewForm { points: Some(-1) }.into_payload().is_err());
    }
}
