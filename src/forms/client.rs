use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::client::{ClientStatus, NewClient, UpdateClient};
use crate::domain::types::{
    CaseNumber, EmailAddress, FirmId, PersonName, PhoneNumber, SanitizedText,
};
use crate::forms::{
    FormError, empty_as_none, parse_choice, parse_optional_date, validate_phone,
};

/// Add/edit client form. Both screens post the same fields.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Validate)]
pub struct ClientForm {
    #[validate(length(min = 1, max = 128, message = "Name is required."))]
    pub name: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(email(message = "Enter a valid email address."))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub date_of_birth: Option<String>,
    #[validate(length(min = 1, max = 64, message = "Case number is required."))]
    pub case_number: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 512, message = "Address is too long."))]
    pub address: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    ClientStatus::Active.as_str().to_string()
}

/// Trusted client fields.
#[derive(Debug)]
pub struct ClientPayload {
    pub name: PersonName,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub date_of_birth: Option<chrono::NaiveDate>,
    pub case_number: CaseNumber,
    pub address: SanitizedText,
    pub status: ClientStatus,
}

impl TryFrom<ClientForm> for ClientPayload {
    type Error = FormError;

    fn try_from(form: ClientForm) -> Result<Self, Self::Error> {
        form.validate()?;

        Ok(Self {
            name: PersonName::new(form.name).map_err(|_| FormError::Required("name"))?,
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
            date_of_birth: parse_optional_date(form.date_of_birth.as_deref(), "date_of_birth")?,
            case_number: CaseNumber::new(form.case_number)
                .map_err(|_| FormError::Required("case_number"))?,
            address: SanitizedText::new(form.address.unwrap_or_default()),
            status: parse_choice(&form.status, "status")?,
        })
    }
}

impl ClientPayload {
    pub fn into_new(self, firm_id: FirmId) -> NewClient {
        NewClient {
            firm_id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            date_of_birth: self.date_of_birth,
            case_number: self.case_number,
            address: self.address,
            status: self.status,
        }
    }

    pub fn into_update(self) -> UpdateClient {
        UpdateClient {
            name: self.name,
            email: self.email,
            phone: self.phone,
            date_of_birth: self.date_of_birth,
            case_number: self.case_number,
            address: self.address,
            status: self.status,
        }
    }
}

impl From<&crate::domain::client::Client> for ClientForm {
    /// Prefills the edit form.
    fn from(client: &crate::domain::client::Client) -> Self {
        Self {
            name: client.name.to_string(),
            email: client.email.as_ref().map(ToString::to_string),
            phone: client.phone.as_ref().map(ToString::to_string),
            date_of_birth: client
                .date_of_birth
                .map(|d| d.format("%Y-%m-%d").to_string()),
            case_number: client.case_number.to_string(),
            address: (!client.address.is_empty()).then(|| client.address.to_string()),
            status: client.status.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ClientForm {
        ClientForm {
            name: "  Jane Roe ".into(),
            email: Some("JANE@example.com".into()),
            phone: Some("555 123 4567".into()),
            date_of_birth: Some("1984-05-06".into()),
            case_number: "CASE-9".into(),
            address: Some("<b>1 Main</b> St".into()),
            status: "pending".into(),
        }
    }

    #[test]
    fn valid_form_becomes_payload() {
        let payload = ClientPayload::try_from(form()).expect("valid form");
        assert_eq!(payload.name.as_str(), "Jane Roe");
        assert_eq!(payload.email.unwrap().as_str(), "jane@example.com");
        assert_eq!(payload.phone.unwrap().as_str(), "(555) 123-4567");
        assert_eq!(payload.address.as_str(), "<b>1 Main</b> St");
        assert_eq!(payload.status, ClientStatus::Pending);
    }

    #[test]
    fn invalid_fields_are_reported_by_name() {
        let mut bad = form();
        bad.name = String::new();
        bad.email = Some("nope".into());
        bad.phone = Some("12".into());

        let err = ClientPayload::try_from(bad).unwrap_err();
        let fields = err.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("phone"));
    }

    #[test]
    fn unknown_status_is_rejected() {
        let mut bad = form();
        bad.status = "archived".into();
        assert!(matches!(
            ClientPayload::try_from(bad),
            Err(FormError::InvalidChoice { field: "status", .. })
        ));
    }

    #[test]
    fn optional_fields_may_be_blank() {
        let mut sparse = form();
        sparse.email = None;
        sparse.phone = None;
        sparse.date_of_birth = None;
        sparse.address = None;
        let payload = ClientPayload::try_from(sparse).expect("valid form");
        assert!(payload.email.is_none());
        assert!(payload.address.is_empty());
    }
}
