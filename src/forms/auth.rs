//! Sign-in and password recovery forms.

use serde::Deserialize;
use validator::Validate;

use crate::domain::types::EmailAddress;
use crate::forms::{FormError, validate_password_strength};

#[derive(Debug, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 1, message = "Enter your password."))]
    pub password: String,
}

pub struct LoginPayload {
    pub email: EmailAddress,
    pub password: String,
}

impl TryFrom<LoginForm> for LoginPayload {
    type Error = FormError;

    fn try_from(form: LoginForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            email: EmailAddress::new(form.email).map_err(|_| FormError::InvalidEmail)?,
            password: form.password,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordForm {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
}

impl TryFrom<ForgotPasswordForm> for EmailAddress {
    type Error = FormError;

    fn try_from(form: ForgotPasswordForm) -> Result<Self, Self::Error> {
        form.validate()?;
        EmailAddress::new(form.email).map_err(|_| FormError::InvalidEmail)
    }
}

/// New password submitted from the recovery link.
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordForm {
    #[validate(length(min = 1, message = "The recovery link is incomplete."))]
    pub token: String,
    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match."))]
    pub confirm_password: String,
}

pub struct ResetPasswordPayload {
    pub token: String,
    pub password: String,
}

impl TryFrom<ResetPasswordForm> for ResetPasswordPayload {
    type Error = FormError;

    fn try_from(form: ResetPasswordForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            token: form.token,
            password: form.password,
        })
    }
}
