use serde::{Deserialize, Serialize};

use super::rules::is_complete_cpf;
use super::{ValidationErrors, Validator};
use crate::models::District;
use crate::utils::cpf_digits;

/// Sign-in form, sent as-is to `POST /login`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_string(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.required("email", &self.email, "Email is required")
            .email("email", &self.email, "Enter a valid email")
            .required("password", &self.password, "Password is required");
        v.finish()
    }

    /// Only the email is needed to request a password reset
    pub fn validate_email_only(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.required("email", &self.email, "Email is required")
            .email("email", &self.email, "Enter a valid email");
        v.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasswordPayload {
    pub password: String,
}

/// New password with confirmation, from a reset link
#[derive(Debug, Clone, Default)]
pub struct PasswordResetForm {
    pub password: String,
    pub confirm_password: String,
}

impl PasswordResetForm {
    pub fn into_payload(self) -> Result<PasswordPayload, ValidationErrors> {
        let mut v = Validator::new();
        v.required("password", &self.password, "Password is required")
            .required("confirm_password", &self.confirm_password, "Confirm the password")
            .check(
                "confirm_password",
                self.password == self.confirm_password,
                "match",
                "Passwords do not match",
            );
        v.finish()?;
        Ok(PasswordPayload {
            password: self.password,
        })
    }
}

/// Team half of the public registration form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamDraft {
    #[serde(rename = "nome")]
    pub name: String,
    /// Handle without the leading `@`
    pub instagram: String,
    #[serde(rename = "distritoId")]
    pub district_id: Option<i64>,
    #[serde(rename = "igrejaId")]
    pub church_id: Option<i64>,
}

/// Leader half of the public registration form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderDraft {
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    pub cpf: String,
    pub password: String,
}

/// Payload of `POST /equipe`: a new team together with its leader account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRegistration {
    #[serde(rename = "equipe")]
    pub team: TeamDraft,
    #[serde(rename = "lider")]
    pub leader: LeaderDraft,
}

impl TeamRegistration {
    /// Validate both steps and normalize handle and CPF.
    ///
    /// When `districts` is non-empty the chosen church must belong to the
    /// chosen district.
    pub fn prepare(mut self, districts: &[District]) -> Result<Self, ValidationErrors> {
        self.team.name = self.team.name.trim().to_string();
        self.team.instagram = self.team.instagram.trim().trim_start_matches('@').to_string();
        self.leader.name = self.leader.name.trim().to_string();
        self.leader.email = self.leader.email.trim().to_string();
        self.leader.cpf = cpf_digits(&self.leader.cpf);

        let church_in_district = match (self.team.district_id, self.team.church_id) {
            (Some(district_id), Some(church_id)) if !districts.is_empty() => districts
                .iter()
                .find(|d| d.id == district_id)
                .and_then(|d| d.church(church_id))
                .is_some(),
            _ => true,
        };

        let mut v = Validator::new();
        v.required("equipe.nome", &self.team.name, "Team name is required")
            .required("equipe.instagram", &self.team.instagram, "Team instagram is required")
            .required_some("equipe.distritoId", &self.team.district_id, "Team district is required")
            .required_some("equipe.igrejaId", &self.team.church_id, "Team church is required")
            .check(
                "equipe.igrejaId",
                church_in_district,
                "exists",
                "Church does not belong to the selected district",
            )
            .required("lider.nome", &self.leader.name, "Leader name is required")
            .required("lider.email", &self.leader.email, "Leader email is required")
            .email("lider.email", &self.leader.email, "Enter a valid email")
            .required("lider.cpf", &self.leader.cpf, "Leader CPF is required")
            .check("lider.cpf", is_complete_cpf(&self.leader.cpf), "cpf", "CPF must have 11 digits")
            .required("lider.password", &self.leader.password, "Password is required");
        v.finish()?;
        Ok(self)
    }
}

/// Editable team fields, sent to `PUT /equipe/:id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamPayload {
    #[serde(rename = "nome")]
    pub name: String,
    pub instagram: String,
}

impl TeamPayload {
    pub fn new(name: &str, instagram: &str) -> Result<Self, ValidationErrors> {
        let name = name.trim().to_string();
        let instagram = instagram.trim().trim_start_matches('@').to_string();

        let mut v = Validator::new();
        v.required("nome", &name, "Team name is required")
            .required("instagram", &instagram, "Team instagram is required");
        v.finish()?;
        Ok(Self { name, instagram })
    }
}
