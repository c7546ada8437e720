use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    CaseNumber, ClientId, EmailAddress, FirmId, PersonName, PhoneNumber, SanitizedText,
    closed_enum,
};

closed_enum!(
    /// Engagement status of a client.
    ClientStatus {
        Active => ("active", "Active"),
        Inactive => ("inactive", "Inactive"),
        Pending => ("pending", "Pending"),
    }
);

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Client {
    pub id: ClientId,
    pub firm_id: FirmId,
    pub name: PersonName,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub date_of_birth: Option<NaiveDate>,
    pub case_number: CaseNumber,
    pub address: SanitizedText,
    pub status: ClientStatus,
    /// Number of records requests opened for the client.
    pub total_requests: u32,
    /// Number of those requests still awaiting records.
    pub pending_requests: u32,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewClient {
    pub firm_id: FirmId,
    pub name: PersonName,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub date_of_birth: Option<NaiveDate>,
    pub case_number: CaseNumber,
    pub address: SanitizedText,
    pub status: ClientStatus,
}

#[derive(Clone, Debug)]
pub struct UpdateClient {
    pub name: PersonName,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub date_of_birth: Option<NaiveDate>,
    pub case_number: CaseNumber,
    pub address: SanitizedText,
    pub status: ClientStatus,
}

impl Client {
    /// Builds the stored client from a creation payload.
    pub fn from_new(id: ClientId, new: NewClient, created_at: NaiveDateTime) -> Self {
        Self {
            id,
            firm_id: new.firm_id,
            name: new.name,
            email: new.email,
            phone: new.phone,
            date_of_birth: new.date_of_birth,
            case_number: new.case_number,
            address: new.address,
            status: new.status,
            total_requests: 0,
            pending_requests: 0,
            created_at,
        }
    }

    /// Overwrites the editable fields, keeping identity and counters.
    pub fn apply(&mut self, updates: UpdateClient) {
        self.name = updates.name;
        self.email = updates.email;
        self.phone = updates.phone;
        self.date_of_birth = updates.date_of_birth;
        self.case_number = updates.case_number;
        self.address = updates.address;
        self.status = updates.status;
    }

    /// Case-insensitive match against name, email and case number.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.case_number.to_lowercase().contains(&needle)
            || self
                .email
                .as_ref()
                .is_some_and(|email| email.as_str().contains(&needle))
    }
}
