//! Demo dataset loaded into the in-memory repository at startup.
//!
//! Dates are laid out relative to "today" so the dashboard always shows a
//! mix of upcoming and overdue requests.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta, Utc};

use crate::domain::client::{Client, ClientStatus};
use crate::domain::document::{Document, DocumentCategory, DocumentStatus};
use crate::domain::firm::Firm;
use crate::domain::provider::{Provider, ProviderStatus, ProviderType};
use crate::domain::request::{RecordsRequest, RequestPriority, RequestStatus, RequestType};
use crate::domain::types::{
    CaseNumber, ClientId, DocumentId, EmailAddress, FirmId, FirmName, PersonName, PhoneNumber,
    ProviderId, RequestId, SanitizedText, Subdomain,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::memory::Store;

/// Tenant the demo accounts belong to.
pub const DEMO_FIRM_ID: i32 = 1;

pub const DEMO_FIRM_NAME: &str = "Smith & Associates Law";

fn shift(today: NaiveDate, days: i64) -> RepositoryResult<NaiveDate> {
    today
        .checked_add_signed(TimeDelta::days(days))
        .ok_or_else(|| RepositoryError::Unexpected(format!("date out of range: {days}")))
}

fn at_nine(date: NaiveDate) -> RepositoryResult<NaiveDateTime> {
    date.and_hms_opt(9, 0, 0)
        .ok_or_else(|| RepositoryError::Unexpected("invalid time".to_string()))
}

fn optional_phone(raw: &str) -> RepositoryResult<Option<PhoneNumber>> {
    Ok(Some(PhoneNumber::new(raw)?))
}

/// Seeds relative to the current UTC date.
pub fn demo_store() -> RepositoryResult<Store> {
    demo_store_for(Utc::now().date_naive())
}

pub fn demo_store_for(today: NaiveDate) -> RepositoryResult<Store> {
    let firm_id = FirmId::new(DEMO_FIRM_ID)?;

    let firm = Firm {
        id: firm_id,
        name: FirmName::new(DEMO_FIRM_NAME)?,
        subdomain: Subdomain::new("smithlaw")?,
        contact_email: EmailAddress::new("office@smithlaw.example.com")?,
        phone: optional_phone("5550100200")?,
        created_at: at_nine(shift(today, -400)?)?,
    };

    // (name, email, phone, dob, case, address, status, total, pending, age in days)
    let client_rows = [
        ("John Smith", "john.smith@example.com", "5551234567", (1978, 3, 14), "CASE-2024-001", "12 Oak Street, Springfield", ClientStatus::Active, 3, 1, 120),
        ("Maria Garcia", "maria.garcia@example.com", "5552345678", (1985, 7, 2), "CASE-2024-002", "48 Elm Avenue, Springfield", ClientStatus::Active, 2, 2, 95),
        ("Robert Johnson", "r.johnson@example.com", "5553456789", (1962, 11, 23), "CASE-2024-003", "7 Pine Road, Shelbyville", ClientStatus::Pending, 1, 1, 60),
        ("Emily Davis", "emily.davis@example.com", "5554567890", (1990, 1, 9), "CASE-2024-004", "301 Maple Court, Springfield", ClientStatus::Active, 2, 0, 45),
        ("Michael Brown", "m.brown@example.com", "5555678901", (1971, 5, 30), "CASE-2023-017", "90 Cedar Lane, Capital City", ClientStatus::Inactive, 1, 0, 380),
        ("Sarah Wilson", "sarah.wilson@example.com", "5556789012", (1988, 9, 17), "CASE-2024-005", "15 Birch Way, Shelbyville", ClientStatus::Active, 1, 1, 20),
        ("David Lee", "david.lee@example.com", "5557890123", (1995, 12, 4), "CASE-2024-006", "220 Walnut Drive, Springfield", ClientStatus::Pending, 0, 0, 7),
        ("Linda Martinez", "linda.m@example.com", "5558901234", (1969, 4, 21), "CASE-2024-007", "5 Aspen Circle, Capital City", ClientStatus::Active, 1, 1, 12),
    ];

    let mut clients = Vec::with_capacity(client_rows.len());
    for (idx, (name, email, phone, (y, m, d), case, address, status, total, pending, age)) in
        client_rows.into_iter().enumerate()
    {
        clients.push(Client {
            id: ClientId::new(idx as i32 + 1)?,
            firm_id,
            name: PersonName::new(name)?,
            email: Some(EmailAddress::new(email)?),
            phone: optional_phone(phone)?,
            date_of_birth: NaiveDate::from_ymd_opt(y, m, d),
            case_number: CaseNumber::new(case)?,
            address: SanitizedText::new(address),
            status,
            total_requests: total,
            pending_requests: pending,
            created_at: at_nine(shift(today, -age)?)?,
        });
    }

    // (name, type, email, phone, address, status, success rate, avg response days)
    let provider_rows = [
        ("Springfield General Hospital", ProviderType::Hospital, "records@sgh.example.com", "5550001111", "1 Hospital Plaza, Springfield", ProviderStatus::Active, 92.5, 7.2),
        ("Lakeside Family Clinic", ProviderType::Clinic, "frontdesk@lakeside.example.com", "5550002222", "88 Lake Road, Shelbyville", ProviderStatus::Active, 88.0, 5.5),
        ("Dr. Alan Reeves", ProviderType::Physician, "office@reeves-md.example.com", "5550003333", "14 Medical Row, Springfield", ProviderStatus::Active, 95.0, 3.8),
        ("Capital Imaging Center", ProviderType::ImagingCenter, "films@capimaging.example.com", "5550004444", "600 Scan Street, Capital City", ProviderStatus::Active, 78.5, 10.4),
        ("QuickLab Diagnostics", ProviderType::Laboratory, "results@quicklab.example.com", "5550005555", "42 Test Tube Ave, Springfield", ProviderStatus::Active, 97.0, 2.1),
        ("CarePlus Pharmacy", ProviderType::Pharmacy, "rx@careplus.example.com", "5550006666", "9 Main Street, Shelbyville", ProviderStatus::Inactive, 70.0, 12.0),
    ];

    let mut providers = Vec::with_capacity(provider_rows.len());
    for (idx, (name, provider_type, email, phone, address, status, success_rate, response)) in
        provider_rows.into_iter().enumerate()
    {
        providers.push(Provider {
            id: ProviderId::new(idx as i32 + 1)?,
            firm_id,
            name: PersonName::new(name)?,
            provider_type,
            email: Some(EmailAddress::new(email)?),
            phone: optional_phone(phone)?,
            address: SanitizedText::new(address),
            status,
            success_rate,
            avg_response_days: response,
        });
    }

    // (client, provider, type, status, priority, due in days, created days ago, notes)
    let request_rows = [
        (1, 1, RequestType::MedicalRecords, RequestStatus::InProgress, RequestPriority::High, 5, 20, "ER visit records following the accident."),
        (1, 4, RequestType::Imaging, RequestStatus::Completed, RequestPriority::Medium, -10, 40, "MRI of lower back."),
        (1, 1, RequestType::BillingRecords, RequestStatus::Completed, RequestPriority::Low, -20, 60, ""),
        (2, 2, RequestType::MedicalRecords, RequestStatus::Pending, RequestPriority::Urgent, 2, 3, "Client needs records before mediation."),
        (2, 5, RequestType::LabResults, RequestStatus::Overdue, RequestPriority::High, -4, 30, "Blood panel from March."),
        (3, 3, RequestType::MedicalRecords, RequestStatus::Pending, RequestPriority::Medium, -1, 25, "Follow-up visit notes."),
        (4, 4, RequestType::Imaging, RequestStatus::Completed, RequestPriority::Medium, -15, 45, "X-ray films, both knees."),
        (4, 6, RequestType::PharmacyRecords, RequestStatus::Cancelled, RequestPriority::Low, 10, 35, "Duplicate request."),
        (5, 1, RequestType::MedicalRecords, RequestStatus::Completed, RequestPriority::Low, -200, 300, ""),
        (6, 2, RequestType::BillingRecords, RequestStatus::InProgress, RequestPriority::Medium, 14, 10, "Itemized bill for visits since January."),
        (8, 5, RequestType::LabResults, RequestStatus::Pending, RequestPriority::High, 21, 1, ""),
    ];

    let mut requests = Vec::with_capacity(request_rows.len());
    for (idx, (client, provider, request_type, status, priority, due, created, notes)) in
        request_rows.into_iter().enumerate()
    {
        requests.push(RecordsRequest {
            id: RequestId::new(idx as i32 + 1)?,
            firm_id,
            client_id: ClientId::new(client)?,
            provider_id: ProviderId::new(provider)?,
            request_type,
            status,
            priority,
            due_date: shift(today, due)?,
            notes: SanitizedText::new(notes),
            created_at: at_nine(shift(today, -created)?)?,
        });
    }

    // (client, file name, mime, size, category, status, tags, uploaded days ago)
    let document_rows = [
        (Some(1), "smith_er_records.pdf", "application/pdf", 2_457_600, DocumentCategory::MedicalRecord, DocumentStatus::Reviewed, &["er", "accident"][..], 15),
        (Some(1), "smith_mri_lumbar.tiff", "image/tiff", 18_874_368, DocumentCategory::Imaging, DocumentStatus::PendingReview, &["mri"][..], 8),
        (Some(2), "garcia_invoice_2024.pdf", "application/pdf", 312_000, DocumentCategory::Billing, DocumentStatus::PendingReview, &["invoice"][..], 4),
        (Some(4), "davis_knee_xray.png", "image/png", 4_194_304, DocumentCategory::Imaging, DocumentStatus::Reviewed, &["x-ray", "knee"][..], 30),
        (Some(5), "brown_settlement_letter.pdf", "application/pdf", 98_304, DocumentCategory::Correspondence, DocumentStatus::Archived, &["settlement"][..], 250),
        (Some(3), "johnson_hipaa_authorization.pdf", "application/pdf", 150_000, DocumentCategory::Legal, DocumentStatus::Reviewed, &["hipaa", "authorization"][..], 22),
        (None, "provider_fax_cover.jpg", "image/jpeg", 512_000, DocumentCategory::Other, DocumentStatus::PendingReview, &[][..], 2),
    ];

    let mut documents = Vec::with_capacity(document_rows.len());
    for (idx, (client, file_name, file_type, size, category, status, tags, uploaded)) in
        document_rows.into_iter().enumerate()
    {
        documents.push(Document {
            id: DocumentId::new(idx as i32 + 1)?,
            firm_id,
            client_id: client.map(ClientId::new).transpose()?,
            file_name: file_name.to_string(),
            file_type: file_type.to_string(),
            size,
            category,
            status,
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            uploaded_at: at_nine(shift(today, -uploaded)?)?,
        });
    }

    Ok(Store {
        firms: vec![firm],
        clients,
        providers,
        requests,
        documents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_store_is_consistent() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let store = demo_store_for(today).expect("seed builds");

        assert_eq!(store.firms.len(), 1);
        assert!(!store.clients.is_empty());
        for request in &store.requests {
            assert!(store.clients.iter().any(|c| c.id == request.client_id));
            assert!(store.providers.iter().any(|p| p.id == request.provider_id));
        }
        assert!(store.requests.iter().any(|r| r.is_overdue(today)));
    }
}
