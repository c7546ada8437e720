//! CSV and JSON downloads.

use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;

use crate::domain::client::Client;
use crate::domain::dashboard::DashboardMetrics;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("csv buffer error: {0}")]
    Buffer(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One CSV row per client.
#[derive(Serialize)]
struct ClientRow<'a> {
    id: i32,
    name: &'a str,
    email: &'a str,
    phone: &'a str,
    date_of_birth: String,
    case_number: &'a str,
    address: &'a str,
    status: &'static str,
    total_requests: u32,
    pending_requests: u32,
    created_at: String,
}

impl<'a> From<&'a Client> for ClientRow<'a> {
    fn from(client: &'a Client) -> Self {
        Self {
            id: client.id.get(),
            name: client.name.as_str(),
            email: client.email.as_ref().map(|e| e.as_str()).unwrap_or_default(),
            phone: client.phone.as_ref().map(|p| p.as_str()).unwrap_or_default(),
            date_of_birth: client
                .date_of_birth
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            case_number: client.case_number.as_str(),
            address: client.address.as_str(),
            status: client.status.as_str(),
            total_requests: client.total_requests,
            pending_requests: client.pending_requests,
            created_at: client.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

const CLIENT_HEADERS: [&str; 11] = [
    "id",
    "name",
    "email",
    "phone",
    "date_of_birth",
    "case_number",
    "address",
    "status",
    "total_requests",
    "pending_requests",
    "created_at",
];

/// Serializes clients as CSV with a header row, even when empty.
pub fn clients_to_csv(clients: &[Client]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(CLIENT_HEADERS)?;
    for client in clients {
        writer.serialize(ClientRow::from(client))?;
    }

    writer
        .into_inner()
        .map_err(|err| ExportError::Buffer(err.to_string()))
}

#[derive(Serialize)]
struct MetricsSnapshot<'a> {
    firm: &'a str,
    generated_at: NaiveDateTime,
    metrics: &'a DashboardMetrics,
}

/// Pretty-printed JSON snapshot of the dashboard metrics.
pub fn metrics_to_json(
    firm: &str,
    metrics: &DashboardMetrics,
    generated_at: NaiveDateTime,
) -> Result<Vec<u8>, ExportError> {
    let snapshot = MetricsSnapshot {
        firm,
        generated_at,
        metrics,
    };
    Ok(serde_json::to_vec_pretty(&snapshot)?)
}

/// `attachment` disposition value for a download named `{stem}-{date}.{ext}`.
pub fn attachment_name(stem: &str, date: chrono::NaiveDate, extension: &str) -> String {
    format!("{stem}-{}.{extension}", date.format("%Y-%m-%d"))
}
