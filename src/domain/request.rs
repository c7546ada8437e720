//! Records requests: a client's medical records asked of a provider.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    ClientId, FirmId, ProviderId, RequestId, SanitizedText, closed_enum,
};

closed_enum!(
    RequestType {
        MedicalRecords => ("medical_records", "Medical Records"),
        BillingRecords => ("billing_records", "Billing Records"),
        Imaging => ("imaging", "Imaging"),
        LabResults => ("lab_results", "Lab Results"),
        PharmacyRecords => ("pharmacy_records", "Pharmacy Records"),
    }
);

closed_enum!(
    /// Request status. Any status may follow any other.
    RequestStatus {
        Pending => ("pending", "Pending"),
        InProgress => ("in_progress", "In Progress"),
        Completed => ("completed", "Completed"),
        Overdue => ("overdue", "Overdue"),
        Cancelled => ("cancelled", "Cancelled"),
    }
);

closed_enum!(
    /// Ordered from least to most pressing.
    RequestPriority {
        Low => ("low", "Low"),
        Medium => ("medium", "Medium"),
        High => ("high", "High"),
        Urgent => ("urgent", "Urgent"),
    }
);

impl RequestStatus {
    /// Whether the request no longer waits on the provider.
    pub const fn is_closed(self) -> bool {
        matches!(self, RequestStatus::Completed | RequestStatus::Cancelled)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RecordsRequest {
    pub id: RequestId,
    pub firm_id: FirmId,
    pub client_id: ClientId,
    pub provider_id: ProviderId,
    pub request_type: RequestType,
    pub status: RequestStatus,
    pub priority: RequestPriority,
    pub due_date: NaiveDate,
    pub notes: SanitizedText,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewRecordsRequest {
    pub firm_id: FirmId,
    pub client_id: ClientId,
    pub provider_id: ProviderId,
    pub request_type: RequestType,
    pub priority: RequestPriority,
    pub due_date: NaiveDate,
    pub notes: SanitizedText,
}

impl RecordsRequest {
    /// New requests always start as pending.
    pub fn from_new(id: RequestId, new: NewRecordsRequest, created_at: NaiveDateTime) -> Self {
        Self {
            id,
            firm_id: new.firm_id,
            client_id: new.client_id,
            provider_id: new.provider_id,
            request_type: new.request_type,
            status: RequestStatus::Pending,
            priority: new.priority,
            due_date: new.due_date,
            notes: new.notes,
            created_at,
        }
    }

    /// Open and past its due date on `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == RequestStatus::Overdue || (!self.status.is_closed() && self.due_date < today)
    }
}
