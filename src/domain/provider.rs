use serde::{Deserialize, Serialize};

use crate::domain::types::{
    EmailAddress, FirmId, PersonName, PhoneNumber, ProviderId, SanitizedText, closed_enum,
};

closed_enum!(
    /// Kind of healthcare organization records are requested from.
    ProviderType {
        Hospital => ("hospital", "Hospital"),
        Clinic => ("clinic", "Clinic"),
        Physician => ("physician", "Physician"),
        ImagingCenter => ("imaging_center", "Imaging Center"),
        Laboratory => ("laboratory", "Laboratory"),
        Pharmacy => ("pharmacy", "Pharmacy"),
    }
);

closed_enum!(
    ProviderStatus {
        Active => ("active", "Active"),
        Inactive => ("inactive", "Inactive"),
    }
);

/// Healthcare provider with seeded performance figures.
///
/// `success_rate` and `avg_response_days` are static values; nothing in the
/// application recomputes them from request history.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Provider {
    pub id: ProviderId,
    pub firm_id: FirmId,
    pub name: PersonName,
    pub provider_type: ProviderType,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub address: SanitizedText,
    pub status: ProviderStatus,
    /// Share of requests fulfilled, in percent.
    pub success_rate: f32,
    pub avg_response_days: f32,
}

#[derive(Clone, Debug)]
pub struct NewProvider {
    pub firm_id: FirmId,
    pub name: PersonName,
    pub provider_type: ProviderType,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub address: SanitizedText,
    pub status: ProviderStatus,
}

impl Provider {
    /// New providers start without history, so their metrics are zero.
    pub fn from_new(id: ProviderId, new: NewProvider) -> Self {
        Self {
            id,
            firm_id: new.firm_id,
            name: new.name,
            provider_type: new.provider_type,
            email: new.email,
            phone: new.phone,
            address: new.address,
            status: new.status,
            success_rate: 0.0,
            avg_response_days: 0.0,
        }
    }

    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.address.as_str().to_lowercase().contains(&needle)
    }
}
