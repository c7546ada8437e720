use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{EmailAddress, FirmId, FirmName, PhoneNumber, Subdomain};

/// Law-firm tenant.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Firm {
    pub id: FirmId,
    pub name: FirmName,
    pub subdomain: Subdomain,
    pub contact_email: EmailAddress,
    pub phone: Option<PhoneNumber>,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewFirm {
    pub name: FirmName,
    pub subdomain: Subdomain,
    pub contact_email: EmailAddress,
    pub phone: Option<PhoneNumber>,
}

impl Firm {
    pub fn from_new(id: FirmId, new: NewFirm, created_at: NaiveDateTime) -> Self {
        Self {
            id,
            name: new.name,
            subdomain: new.subdomain,
            contact_email: new.contact_email,
            phone: new.phone,
            created_at,
        }
    }
}
