use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::request::{NewRecordsRequest, RequestPriority, RequestStatus, RequestType};
use crate::domain::types::{ClientId, FirmId, ProviderId, RequestId, SanitizedText};
use crate::forms::{FormError, parse_choice};

/// New records request.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Validate)]
pub struct NewRequestForm {
    pub client_id: i32,
    pub provider_id: i32,
    pub request_type: String,
    pub priority: String,
    #[validate(length(min = 1, message = "Pick a due date."))]
    pub due_date: String,
    #[serde(default)]
    #[validate(length(max = 2000, message = "Notes are too long."))]
    pub notes: String,
}

pub struct NewRequestPayload {
    pub client_id: ClientId,
    pub provider_id: ProviderId,
    pub request_type: RequestType,
    pub priority: RequestPriority,
    pub due_date: NaiveDate,
    pub notes: SanitizedText,
}

impl TryFrom<NewRequestForm> for NewRequestPayload {
    type Error = FormError;

    fn try_from(form: NewRequestForm) -> Result<Self, Self::Error> {
        form.validate()?;

        Ok(Self {
            client_id: ClientId::new(form.client_id).map_err(|_| FormError::InvalidClientId)?,
            provider_id: ProviderId::new(form.provider_id)
                .map_err(|_| FormError::InvalidProviderId)?,
            request_type: parse_choice(&form.request_type, "request_type")?,
            priority: parse_choice(&form.priority, "priority")?,
            due_date: NaiveDate::parse_from_str(form.due_date.trim(), "%Y-%m-%d")
                .map_err(|_| FormError::InvalidDate("due_date"))?,
            notes: SanitizedText::new(form.notes),
        })
    }
}

impl NewRequestPayload {
    pub fn into_domain(self, firm_id: FirmId) -> NewRecordsRequest {
        NewRecordsRequest {
            firm_id,
            client_id: self.client_id,
            provider_id: self.provider_id,
            request_type: self.request_type,
            priority: self.priority,
            due_date: self.due_date,
            notes: self.notes,
        }
    }
}

/// Status change for one request. Any status may follow any other.
#[derive(Debug, Deserialize)]
pub struct RequestStatusForm {
    pub status: String,
}

impl TryFrom<RequestStatusForm> for RequestStatus {
    type Error = FormError;

    fn try_from(form: RequestStatusForm) -> Result<Self, Self::Error> {
        parse_choice(&form.status, "status")
    }
}

/// Status change applied to several selected rows.
///
/// Repeated `request_ids` keys are parsed with `serde_html_form`.
#[derive(Debug, Deserialize)]
pub struct BulkStatusForm {
    #[serde(default)]
    pub request_ids: Vec<i32>,
    pub status: String,
}

pub struct BulkStatusPayload {
    pub request_ids: Vec<RequestId>,
    pub status: RequestStatus,
}

impl TryFrom<BulkStatusForm> for BulkStatusPayload {
    type Error = FormError;

    fn try_from(form: BulkStatusForm) -> Result<Self, Self::Error> {
        let mut request_ids = form
            .request_ids
            .into_iter()
            .map(RequestId::new)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| FormError::Required("request_ids"))?;
        request_ids.sort_unstable();
        request_ids.dedup();
        if request_ids.is_empty() {
            return Err(FormError::Required("request_ids"));
        }

        Ok(Self {
            request_ids,
            status: parse_choice(&form.status, "status")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_request_requires_real_ids_and_date() {
        let form = NewRequestForm {
            client_id: 0,
            provider_id: 1,
            request_type: "imaging".into(),
            priority: "high".into(),
            due_date: "2025-07-01".into(),
            notes: String::new(),
        };
        assert!(matches!(
            NewRequestPayload::try_from(form),
            Err(FormError::InvalidClientId)
        ));

        let form = NewRequestForm {
            client_id: 1,
            provider_id: 1,
            request_type: "imaging".into(),
            priority: "high".into(),
            due_date: "July 1st".into(),
            notes: String::new(),
        };
        assert!(matches!(
            NewRequestPayload::try_from(form),
            Err(FormError::InvalidDate("due_date"))
        ));
    }

    #[test]
    fn status_form_accepts_any_known_status() {
        for status in RequestStatus::ALL {
            let form = RequestStatusForm {
                status: status.as_str().to_string(),
            };
            assert_eq!(RequestStatus::try_from(form).unwrap(), *status);
        }
    }

    #[cfg(feature = "server")]
    #[test]
    fn bulk_form_parses_repeated_keys() {
        let body = b"request_ids=3&request_ids=1&request_ids=3&status=completed";
        let form: BulkStatusForm = serde_html_form::from_bytes(body).unwrap();
        let payload = BulkStatusPayload::try_from(form).unwrap();
        assert_eq!(
            payload.request_ids,
            vec![RequestId::new(1).unwrap(), RequestId::new(3).unwrap()]
        );
        assert_eq!(payload.status, RequestStatus::Completed);
    }

    #[test]
    fn bulk_form_needs_a_selection() {
        let form = BulkStatusForm {
            request_ids: vec![],
            status: "completed".into(),
        };
        assert!(matches!(
            BulkStatusPayload::try_from(form),
            Err(FormError::Required("request_ids"))
        ));
    }
}
