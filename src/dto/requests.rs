//! DTOs for the requests list and the rows embedded in other pages.

use serde::{Deserialize, Serialize};

use crate::domain::request::{RecordsRequest, RequestPriority, RequestStatus};
use crate::dto::{SelectOption, lenient, normalize_search};
use crate::pagination::Paginated;
use crate::repository::{RequestSort, SortOrder};

/// A request joined with the names shown next to it.
#[derive(Debug, Clone, Serialize)]
pub struct RequestRow {
    #[serde(flatten)]
    pub request: RecordsRequest,
    pub client_name: String,
    pub provider_name: String,
    pub type_label: &'static str,
    pub status_label: &'static str,
    pub priority_label: &'static str,
    pub overdue: bool,
}

/// Raw query string of `/requests`.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct RequestsQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub page: Option<usize>,
}

/// Parsed and normalized version of [`RequestsQuery`].
#[derive(Debug, Default, Clone, Serialize)]
pub struct RequestFilters {
    pub search: Option<String>,
    pub status: Option<RequestStatus>,
    pub priority: Option<RequestPriority>,
    pub sort: Option<RequestSort>,
    pub order: SortOrder,
    pub page: usize,
}

impl From<&RequestsQuery> for RequestFilters {
    fn from(query: &RequestsQuery) -> Self {
        Self {
            search: normalize_search(query.search.as_deref()),
            status: lenient(query.status.as_deref()),
            priority: lenient(query.priority.as_deref()),
            sort: lenient(query.sort.as_deref()),
            order: lenient(query.order.as_deref()).unwrap_or_default(),
            page: query.page.unwrap_or(1).max(1),
        }
    }
}

/// Data required to render `requests/index.html`.
#[derive(Debug, Serialize)]
pub struct RequestsPageData {
    pub requests: Paginated<RequestRow>,
    pub filters: RequestFilters,
    /// Active clients and providers offered by the "new request" form.
    pub client_options: Vec<SelectOption>,
    pub provider_options: Vec<SelectOption>,
}
