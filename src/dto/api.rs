//! DTOs exposed by the JSON API endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::client::Client;

/// Query parameters accepted by `/api/v1/clients`.
#[derive(Debug, Default, Deserialize)]
pub struct ClientsQuery {
    /// Optional free-form search string applied to the client list.
    pub search: Option<String>,
    /// Optional page number for pagination.
    pub page: Option<usize>,
}

/// Result payload returned by [`crate::services::api::list_clients`].
#[derive(Debug, Serialize)]
pub struct ClientsResponse {
    /// Total number of clients matching the filter.
    pub total: usize,
    pub page: usize,
    /// Page of clients requested by the caller.
    pub clients: Vec<Client>,
}

/// Error body of every failed API call.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
