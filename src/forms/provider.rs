use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::provider::{NewProvider, ProviderStatus, ProviderType};
use crate::domain::types::{EmailAddress, FirmId, PersonName, PhoneNumber, SanitizedText};
use crate::forms::{FormError, empty_as_none, parse_choice, validate_phone};

#[derive(Clone, Debug, Default, Deserialize, Serialize, Validate)]
pub struct AddProviderForm {
    #[validate(length(min = 1, max = 128, message = "Name is required."))]
    pub name: String,
    pub provider_type: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(email(message = "Enter a valid email address."))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 512, message = "Address is too long."))]
    pub address: Option<String>,
}

pub struct AddProviderPayload {
    pub name: PersonName,
    pub provider_type: ProviderType,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub address: SanitizedText,
}

impl TryFrom<AddProviderForm> for AddProviderPayload {
    type Error = FormError;

    fn try_from(form: AddProviderForm) -> Result<Self, Self::Error> {
        form.validate()?;

        Ok(Self {
            name: PersonName::new(form.name).map_err(|_| FormError::Required("name"))?,
            provider_type: parse_choice(&form.provider_type, "provider_type")?,
            email: form
                .email
                .map(EmailAddress::new)
                .transpose()
                .map_err(|_| FormError::InvalidEmail)?,
            phone: form
                .phone
                .map(PhoneNumber::new)
                .transpose()
                .map_err(|_| FormError::InvalidPhoneNumber)?,
            address: SanitizedText::new(form.address.unwrap_or_default()),
        })
    }
}

impl AddProviderPayload {
    /// New providers start active with empty performance metrics.
    pub fn into_domain(self, firm_id: FirmId) -> NewProvider {
        NewProvider {
            firm_id,
            name: self.name,
            provider_type: self.provider_type,
            email: self.email,
            phone: self.phone,
            address: self.address,
            status: ProviderStatus::Active,
        }
    }
}
