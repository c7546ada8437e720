use crate::domain::client::{Client, ClientStatus, NewClient, UpdateClient};
use crate::domain::document::{Document, DocumentCategory, DocumentStatus};
use crate::domain::firm::{Firm, NewFirm};
use crate::domain::provider::{NewProvider, Provider, ProviderStatus, ProviderType};
use crate::domain::request::{
    NewRecordsRequest, RecordsRequest, RequestPriority, RequestStatus,
};
use crate::domain::types::{ClientId, DocumentId, FirmId, ProviderId, RequestId, closed_enum};
use crate::repository::errors::RepositoryResult;

pub mod errors;
pub mod memory;
#[cfg(feature = "test-mocks")]
pub mod mock;
pub mod seed;

pub use memory::InMemoryRepository;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

closed_enum!(
    SortOrder {
        Asc => ("asc", "Ascending"),
        Desc => ("desc", "Descending"),
    }
);

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Asc
    }
}

closed_enum!(
    ClientSort {
        Name => ("name", "Name"),
        Created => ("created", "Date added"),
        CaseNumber => ("case_number", "Case number"),
    }
);

closed_enum!(
    ProviderSort {
        Name => ("name", "Name"),
        SuccessRate => ("success_rate", "Success rate"),
        ResponseTime => ("response_time", "Response time"),
    }
);

closed_enum!(
    RequestSort {
        DueDate => ("due_date", "Due date"),
        Priority => ("priority", "Priority"),
        Created => ("created", "Created"),
    }
);

#[derive(Debug, Clone)]
pub struct ClientListQuery {
    pub firm_id: FirmId,
    pub search: Option<String>,
    pub status: Option<ClientStatus>,
    pub sort: ClientSort,
    pub order: SortOrder,
    pub pagination: Option<Pagination>,
}

impl ClientListQuery {
    pub fn new(firm_id: FirmId) -> Self {
        Self {
            firm_id,
            search: None,
            status: None,
            sort: ClientSort::Name,
            order: SortOrder::Asc,
            pagination: None,
        }
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn status(mut self, status: ClientStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn sort(mut self, sort: ClientSort, order: SortOrder) -> Self {
        self.sort = sort;
        self.order = order;
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone)]
pub struct ProviderListQuery {
    pub firm_id: FirmId,
    pub search: Option<String>,
    pub provider_type: Option<ProviderType>,
    pub status: Option<ProviderStatus>,
    pub sort: ProviderSort,
    pub order: SortOrder,
    pub pagination: Option<Pagination>,
}

impl ProviderListQuery {
    pub fn new(firm_id: FirmId) -> Self {
        Self {
            firm_id,
            search: None,
            provider_type: None,
            status: None,
            sort: ProviderSort::Name,
            order: SortOrder::Asc,
            pagination: None,
        }
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn provider_type(mut self, provider_type: ProviderType) -> Self {
        self.provider_type = Some(provider_type);
        self
    }

    pub fn status(mut self, status: ProviderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn sort(mut self, sort: ProviderSort, order: SortOrder) -> Self {
        self.sort = sort;
        self.order = order;
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone)]
pub struct RequestListQuery {
    pub firm_id: FirmId,
    pub search: Option<String>,
    pub status: Option<RequestStatus>,
    pub priority: Option<RequestPriority>,
    pub client_id: Option<ClientId>,
    pub provider_id: Option<ProviderId>,
    pub sort: RequestSort,
    pub order: SortOrder,
    pub pagination: Option<Pagination>,
}

impl RequestListQuery {
    pub fn new(firm_id: FirmId) -> Self {
        Self {
            firm_id,
            search: None,
            status: None,
            priority: None,
            client_id: None,
            provider_id: None,
            sort: RequestSort::DueDate,
            order: SortOrder::Asc,
            pagination: None,
        }
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn status(mut self, status: RequestStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn priority(mut self, priority: RequestPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn client(mut self, client_id: ClientId) -> Self {
        self.client_id = Some(client_id);
        self
    }

    pub fn provider(mut self, provider_id: ProviderId) -> Self {
        self.provider_id = Some(provider_id);
        self
    }

    pub fn sort(mut self, sort: RequestSort, order: SortOrder) -> Self {
        self.sort = sort;
        self.order = order;
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone)]
pub struct DocumentListQuery {
    pub firm_id: FirmId,
    pub search: Option<String>,
    pub category: Option<DocumentCategory>,
    pub status: Option<DocumentStatus>,
    pub client_id: Option<ClientId>,
    pub pagination: Option<Pagination>,
}

impl DocumentListQuery {
    pub fn new(firm_id: FirmId) -> Self {
        Self {
            firm_id,
            search: None,
            category: None,
            status: None,
            client_id: None,
            pagination: None,
        }
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn category(mut self, category: DocumentCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn status(mut self, status: DocumentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn client(mut self, client_id: ClientId) -> Self {
        self.client_id = Some(client_id);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

pub trait FirmReader {
    fn get_firm_by_id(&self, id: FirmId) -> RepositoryResult<Option<Firm>>;
}

pub trait FirmWriter {
    fn create_firm(&self, new_firm: &NewFirm) -> RepositoryResult<Firm>;
}

pub trait ClientReader {
    fn get_client_by_id(&self, id: ClientId, firm_id: FirmId) -> RepositoryResult<Option<Client>>;
    /// Returns the total number of matches and the requested page of them.
    fn list_clients(&self, query: ClientListQuery) -> RepositoryResult<(usize, Vec<Client>)>;
}

pub trait ClientWriter {
    fn create_client(&self, new_client: &NewClient) -> RepositoryResult<Client>;
    fn update_client(
        &self,
        id: ClientId,
        firm_id: FirmId,
        updates: &UpdateClient,
    ) -> RepositoryResult<Client>;
    /// Removes only the client; its requests and documents stay.
    fn delete_client(&self, id: ClientId, firm_id: FirmId) -> RepositoryResult<()>;
}

pub trait ProviderReader {
    fn get_provider_by_id(
        &self,
        id: ProviderId,
        firm_id: FirmId,
    ) -> RepositoryResult<Option<Provider>>;
    fn list_providers(&self, query: ProviderListQuery) -> RepositoryResult<(usize, Vec<Provider>)>;
}

pub trait ProviderWriter {
    fn create_provider(&self, new_provider: &NewProvider) -> RepositoryResult<Provider>;
}

pub trait RequestReader {
    fn get_request_by_id(
        &self,
        id: RequestId,
        firm_id: FirmId,
    ) -> RepositoryResult<Option<RecordsRequest>>;
    fn list_requests(
        &self,
        query: RequestListQuery,
    ) -> RepositoryResult<(usize, Vec<RecordsRequest>)>;
}

pub trait RequestWriter {
    fn create_request(&self, new_request: &NewRecordsRequest) -> RepositoryResult<RecordsRequest>;
    /// Sets the status without checking the transition.
    fn update_request_status(
        &self,
        id: RequestId,
        firm_id: FirmId,
        status: RequestStatus,
    ) -> RepositoryResult<RecordsRequest>;
}

pub trait DocumentReader {
    fn get_document_by_id(
        &self,
        id: DocumentId,
        firm_id: FirmId,
    ) -> RepositoryResult<Option<Document>>;
    fn list_documents(&self, query: DocumentListQuery) -> RepositoryResult<(usize, Vec<Document>)>;
}

pub trait DocumentWriter {
    fn delete_document(&self, id: DocumentId, firm_id: FirmId) -> RepositoryResult<()>;
}
