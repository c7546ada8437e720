//! Single-form firm registration.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::firm::NewFirm;
use crate::domain::types::{EmailAddress, FirmName, PersonName, PhoneNumber, Subdomain};
use crate::forms::{
    FormError, empty_as_none, validate_password_strength, validate_phone, validate_subdomain,
};

#[derive(Clone, Debug, Default, Deserialize, Serialize, Validate)]
pub struct OnboardingForm {
    #[validate(length(min = 1, max = 128, message = "Firm name is required."))]
    pub firm_name: String,
    #[validate(custom(function = "validate_subdomain"))]
    pub subdomain: String,
    #[validate(length(min = 1, max = 128, message = "Your name is required."))]
    pub admin_name: String,
    #[validate(email(message = "Enter a valid email address."))]
    pub admin_email: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    #[serde(skip_serializing)]
    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,
    #[serde(skip_serializing)]
    #[validate(must_match(other = "password", message = "Passwords do not match."))]
    pub confirm_password: String,
}

pub struct OnboardingPayload {
    pub firm: NewFirm,
    pub admin_name: PersonName,
    pub admin_email: EmailAddress,
    pub password: String,
}

impl TryFrom<OnboardingForm> for OnboardingPayload {
    type Error = FormError;

    fn try_from(form: OnboardingForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let admin_email =
            EmailAddress::new(form.admin_email).map_err(|_| FormError::InvalidEmail)?;

        let firm = NewFirm {
            name: FirmName::new(form.firm_name).map_err(|_| FormError::Required("firm_name"))?,
            subdomain: Subdomain::new(&form.subdomain).map_err(|_| FormError::InvalidSubdomain)?,
            contact_email: admin_email.clone(),
            phone: form
                .phone
                .map(PhoneNumber::new)
                .transpose()
                .map_err(|_| FormError::InvalidPhoneNumber)?,
        };

        Ok(Self {
            firm,
            admin_name: PersonName::new(form.admin_name)
                .map_err(|_| FormError::Required("admin_name"))?,
            admin_email,
            password: form.password,
        })
    }
}
