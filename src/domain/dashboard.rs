//! Aggregated figures shown on the dashboard and in the JSON export.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::client::{Client, ClientStatus};
use crate::domain::document::Document;
use crate::domain::provider::Provider;
use crate::domain::request::{RecordsRequest, RequestStatus};

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct DashboardMetrics {
    pub total_clients: usize,
    pub active_clients: usize,
    pub pending_clients: usize,
    pub total_requests: usize,
    pub open_requests: usize,
    pub completed_requests: usize,
    pub overdue_requests: usize,
    pub total_documents: usize,
    pub active_providers: usize,
    /// Mean of the providers' seeded response times, in days.
    pub avg_provider_response_days: f32,
    /// Completed share of all requests, in percent.
    pub completion_rate: f32,
    pub requests_by_status: BTreeMap<String, usize>,
}

impl DashboardMetrics {
    /// Computes the metrics as seen on `today`.
    pub fn compute(
        clients: &[Client],
        providers: &[Provider],
        requests: &[RecordsRequest],
        documents: &[Document],
        today: NaiveDate,
    ) -> Self {
        let count_clients =
            |status: ClientStatus| clients.iter().filter(|c| c.status == status).count();

        let completed_requests = requests
            .iter()
            .filter(|r| r.status == RequestStatus::Completed)
            .count();

        let mut requests_by_status: BTreeMap<String, usize> = RequestStatus::ALL
            .iter()
            .map(|status| (status.as_str().to_string(), 0))
            .collect();
        for request in requests {
            *requests_by_status
                .entry(request.status.as_str().to_string())
                .or_default() += 1;
        }

        let avg_provider_response_days = if providers.is_empty() {
            0.0
        } else {
            providers.iter().map(|p| p.avg_response_days).sum::<f32>() / providers.len() as f32
        };

        let completion_rate = if requests.is_empty() {
            0.0
        } else {
            completed_requests as f32 * 100.0 / requests.len() as f32
        };

        Self {
            total_clients: clients.len(),
            active_clients: count_clients(ClientStatus::Active),
            pending_clients: count_clients(ClientStatus::Pending),
            total_requests: requests.len(),
            open_requests: requests.iter().filter(|r| !r.status.is_closed()).count(),
            completed_requests,
            overdue_requests: requests.iter().filter(|r| r.is_overdue(today)).count(),
            total_documents: documents.len(),
            active_providers: providers
                .iter()
                .filter(|p| p.status == crate::domain::provider::ProviderStatus::Active)
                .count(),
            avg_provider_response_days,
            completion_rate,
            requests_by_status,
        }
    }
}
