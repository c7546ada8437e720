use serde::{Deserialize, Serialize};

use crate::domain::provider::{Provider, ProviderStatus, ProviderType};
use crate::dto::requests::RequestRow;
use crate::dto::{lenient, normalize_search};
use crate::pagination::Paginated;
use crate::repository::{ProviderSort, SortOrder};

/// Raw query string of `/providers`.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct ProvidersQuery {
    pub search: Option<String>,
    pub provider_type: Option<String>,
    pub status: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub page: Option<usize>,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct ProviderFilters {
    pub search: Option<String>,
    pub provider_type: Option<ProviderType>,
    pub status: Option<ProviderStatus>,
    pub sort: Option<ProviderSort>,
    pub order: SortOrder,
    pub page: usize,
}

impl From<&ProvidersQuery> for ProviderFilters {
    fn from(query: &ProvidersQuery) -> Self {
        Self {
            search: normalize_search(query.search.as_deref()),
            provider_type: lenient(query.provider_type.as_deref()),
            status: lenient(query.status.as_deref()),
            sort: lenient(query.sort.as_deref()),
            order: lenient(query.order.as_deref()).unwrap_or_default(),
            page: query.page.unwrap_or(1).max(1),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProvidersPageData {
    pub providers: Paginated<Provider>,
    pub filters: ProviderFilters,
}

/// Provider details with every request sent to it, newest first.
#[derive(Debug, Serialize)]
pub struct ProviderPageData {
    pub provider: Provider,
    pub history: Vec<RequestRow>,
}
