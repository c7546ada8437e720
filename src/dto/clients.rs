//! DTOs shaped for the client list, detail and edit templates.

use serde::{Deserialize, Serialize};

use crate::domain::client::{Client, ClientStatus};
use crate::domain::document::Document;
use crate::dto::requests::RequestRow;
use crate::dto::{lenient, normalize_search};
use crate::forms::client::ClientForm;
use crate::pagination::Paginated;
use crate::repository::{ClientSort, SortOrder};

/// Raw query string of `/clients` and `/clients/export`.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct ClientsQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub page: Option<usize>,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct ClientFilters {
    pub search: Option<String>,
    pub status: Option<ClientStatus>,
    pub sort: Option<ClientSort>,
    pub order: SortOrder,
    pub page: usize,
}

impl From<&ClientsQuery> for ClientFilters {
    fn from(query: &ClientsQuery) -> Self {
        Self {
            search: normalize_search(query.search.as_deref()),
            status: lenient(query.status.as_deref()),
            sort: lenient(query.sort.as_deref()),
            order: lenient(query.order.as_deref()).unwrap_or_default(),
            page: query.page.unwrap_or(1).max(1),
        }
    }
}

/// Data required to render `clients/index.html`.
#[derive(Debug, Serialize)]
pub struct ClientsPageData {
    pub clients: Paginated<Client>,
    pub filters: ClientFilters,
}

/// Aggregated data required to render the client details page.
#[derive(Debug, Serialize)]
pub struct ClientPageData {
    pub client: Client,
    pub requests: Vec<RequestRow>,
    pub documents: Vec<Document>,
}

/// Edit page: the stored client and the prefilled form.
#[derive(Debug, Serialize)]
pub struct ClientEditData {
    pub client: Client,
    pub form: ClientForm,
}
