//! Form definitions backing the dashboard routes.
//!
//! Each form deserializes the raw request body, runs its `validator` rules and
//! converts into a payload of trusted value objects via `TryFrom`.

use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use validator::{ValidationError, ValidationErrors};

use crate::domain::types::{PhoneNumber, Subdomain, is_strong_password};

pub mod auth;
pub mod client;
pub mod onboarding;
pub mod provider;
pub mod request;
#[cfg(feature = "server")]
pub mod upload;

/// Field name → message shown next to the control.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid email address")]
    InvalidEmail,

    #[error("invalid phone number")]
    InvalidPhoneNumber,

    #[error("invalid date in {0}")]
    InvalidDate(&'static str),

    #[error("invalid {field}: {value}")]
    InvalidChoice { field: &'static str, value: String },

    #[error("invalid client id")]
    InvalidClientId,

    #[error("invalid provider id")]
    InvalidProviderId,

    #[error("invalid subdomain")]
    InvalidSubdomain,

    #[error("{0} is required")]
    Required(&'static str),
}

impl FormError {
    /// Messages keyed by the form field that caused them.
    pub fn field_errors(&self) -> FieldErrors {
        let mut fields = FieldErrors::new();
        match self {
            FormError::Validation(errors) => {
                for (field, errors) in errors.field_errors() {
                    if let Some(error) = errors.first() {
                        let message = error
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("Invalid {field}."));
                        fields.insert(field.to_string(), message);
                    }
                }
            }
            FormError::InvalidEmail => {
                fields.insert("email".into(), "Enter a valid email address.".into());
            }
            FormError::InvalidPhoneNumber => {
                fields.insert("phone".into(), "Enter a 10 digit phone number.".into());
            }
            FormError::InvalidDate(field) => {
                fields.insert((*field).into(), "Enter a valid date.".into());
            }
            FormError::InvalidChoice { field, .. } => {
                fields.insert((*field).into(), "Choose one of the listed options.".into());
            }
            FormError::InvalidClientId => {
                fields.insert("client_id".into(), "Select a client.".into());
            }
            FormError::InvalidProviderId => {
                fields.insert("provider_id".into(), "Select a provider.".into());
            }
            FormError::InvalidSubdomain => {
                fields.insert(
                    "subdomain".into(),
                    "Use 3-63 letters, digits or hyphens, not starting or ending with a hyphen."
                        .into(),
                );
            }
            FormError::Required(field) => {
                fields.insert((*field).into(), "This field is required.".into());
            }
        }
        fields
    }
}

/// Treats blank optional inputs as absent.
pub fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty()))
}

fn validation_error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// `validator` hook: the input must format into a complete phone number.
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    PhoneNumber::new(value)
        .map(|_| ())
        .map_err(|_| validation_error("phone", "Enter a 10 digit phone number."))
}

/// `validator` hook: eight characters and at least one digit.
pub fn validate_password_strength(value: &str) -> Result<(), ValidationError> {
    if is_strong_password(value) {
        Ok(())
    } else {
        Err(validation_error(
            "password_strength",
            "Password must be at least 8 characters and contain a number.",
        ))
    }
}

/// `validator` hook: the sanitized subdomain must be usable.
pub fn validate_subdomain(value: &str) -> Result<(), ValidationError> {
    Subdomain::new(value).map(|_| ()).map_err(|_| {
        validation_error(
            "subdomain",
            "Use 3-63 letters, digits or hyphens, not starting or ending with a hyphen.",
        )
    })
}

/// Parses an optional `YYYY-MM-DD` input.
pub(crate) fn parse_optional_date(
    value: Option<&str>,
    field: &'static str,
) -> Result<Option<NaiveDate>, FormError> {
    value
        .map(|v| NaiveDate::parse_from_str(v, "%Y-%m-%d").map_err(|_| FormError::InvalidDate(field)))
        .transpose()
}

/// Parses a closed-enum select value, remembering the field on failure.
pub(crate) fn parse_choice<T>(value: &str, field: &'static str) -> Result<T, FormError>
where
    T: std::str::FromStr,
{
    value.parse().map_err(|_| FormError::InvalidChoice {
        field,
        value: value.to_string(),
    })
}
