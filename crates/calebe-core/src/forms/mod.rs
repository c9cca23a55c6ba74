//! Client-side form validation and request payloads.
//!
//! Each form checks its fields the way the panel's input forms do
//! (required fields, email pattern, numeric values, matching passwords)
//! and turns into the JSON payload the API expects. Failures use the same
//! [`FieldError`] shape as server-side validation errors.

pub mod account;
pub mod content;
pub mod rules;

use thiserror::Error;

use crate::api::FieldError;

pub use account::{
    Credentials, LeaderDraft, PasswordPayload, PasswordResetForm, TeamDraft, TeamPayload, TeamRegistration,
};
pub use content::{
    ChallengeForm, ChallengePayload, DevotionalForm, DevotionalPayload, MemberForm, MemberPayload, ReviewForm,
    ReviewPayload,
};
pub use rules::is_valid_email;

/// One or more fields failed client-side validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid form: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub(crate) fn missing(field: &str, message: &str) -> Self {
        Self(vec![FieldError::new(field, message).with_rule("required")])
    }

    /// Message reported for a field, if it failed
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

/// Collects at most one error per field, first failing rule wins.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    fn has_error(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Record `message` for `field` unless `ok` holds
    pub fn check(&mut self, field: &str, ok: bool, rule: &str, message: &str) -> &mut Self {
        if !ok && !self.has_error(field) {
            self.errors.push(FieldError::new(field, message).with_rule(rule));
        }
        self
    }

    pub fn required(&mut self, field: &str, value: &str, message: &str) -> &mut Self {
        self.check(field, !value.trim().is_empty(), "required", message)
    }

    pub fn required_some<T>(&mut self, field: &str, value: &Option<T>, message: &str) -> &mut Self {
        self.check(field, value.is_some(), "required", message)
    }

    /// Email pattern, only checked once the field has a value
    pub fn email(&mut self, field: &str, value: &str, message: &str) -> &mut Self {
        let value = value.trim();
        self.check(field, value.is_empty() || is_valid_email(value), "email", message)
    }

    /// Optional numeric value that must not be negative
    pub fn non_negative(&mut self, field: &str, value: Option<i64>, message: &str) -> &mut Self {
        self.check(field, value.map(|v| v >= 0).unwrap_or(true), "number", message)
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.errors))
        }
    }
}

/// Trim a free-text value, mapping blank input to `None`
pub(crate) fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
