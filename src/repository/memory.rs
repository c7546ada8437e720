//! Process-local storage backing every repository trait.
//!
//! Data lives only as long as the process; [`InMemoryRepository::seeded`]
//! loads the demo dataset from [`crate::repository::seed`].

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;

use crate::domain::client::{Client, NewClient, UpdateClient};
use crate::domain::document::Document;
use crate::domain::firm::{Firm, NewFirm};
use crate::domain::provider::{NewProvider, Provider};
use crate::domain::request::{NewRecordsRequest, RecordsRequest, RequestStatus};
use crate::domain::types::{ClientId, DocumentId, FirmId, ProviderId, RequestId};
use crate::pagination::page_bounds;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    ClientListQuery, ClientReader, ClientSort, ClientWriter, DocumentListQuery, DocumentReader,
    DocumentWriter, FirmReader, FirmWriter, Pagination, ProviderListQuery, ProviderReader,
    ProviderSort, ProviderWriter, RequestListQuery, RequestReader, RequestSort, RequestWriter,
    SortOrder,
};

/// Raw tables plus id counters.
#[derive(Debug, Default)]
pub struct Store {
    pub firms: Vec<Firm>,
    pub clients: Vec<Client>,
    pub providers: Vec<Provider>,
    pub requests: Vec<RecordsRequest>,
    pub documents: Vec<Document>,
}

impl Store {
    fn next_id<T>(rows: &[T], id: impl Fn(&T) -> i32) -> i32 {
        rows.iter().map(id).max().unwrap_or(0) + 1
    }
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_store(store: Store) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }

    /// Repository preloaded with the demo firm and its records.
    pub fn seeded() -> RepositoryResult<Self> {
        Ok(Self::from_store(crate::repository::seed::demo_store()?))
    }
}

fn ordered(ordering: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

fn paginate<T>(mut rows: Vec<T>, pagination: Option<&Pagination>) -> (usize, Vec<T>) {
    let total = rows.len();
    if let Some(pagination) = pagination {
        let (start, end) = page_bounds(pagination.page, pagination.per_page, total);
        rows = rows.drain(start..end).collect();
    }
    (total, rows)
}

fn search_term(search: Option<&String>) -> Option<String> {
    search
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
}

impl FirmReader for InMemoryRepository {
    fn get_firm_by_id(&self, id: FirmId) -> RepositoryResult<Option<Firm>> {
        let store = self.store.read();
        Ok(store.firms.iter().find(|f| f.id == id).cloned())
    }
}

impl FirmWriter for InMemoryRepository {
    fn create_firm(&self, new_firm: &NewFirm) -> RepositoryResult<Firm> {
        let mut store = self.store.write();
        if store
            .firms
            .iter()
            .any(|f| f.subdomain == new_firm.subdomain)
        {
            return Err(RepositoryError::ConstraintViolation(format!(
                "subdomain {} is taken",
                new_firm.subdomain
            )));
        }
        let id = FirmId::new(Store::next_id(&store.firms, |f| f.id.get()))?;
        let firm = Firm::from_new(id, new_firm.clone(), Utc::now().naive_utc());
        store.firms.push(firm.clone());
        Ok(firm)
    }
}

impl ClientReader for InMemoryRepository {
    fn get_client_by_id(&self, id: ClientId, firm_id: FirmId) -> RepositoryResult<Option<Client>> {
        let store = self.store.read();
        Ok(store
            .clients
            .iter()
            .find(|c| c.id == id && c.firm_id == firm_id)
            .cloned())
    }

    fn list_clients(&self, query: ClientListQuery) -> RepositoryResult<(usize, Vec<Client>)> {
        let store = self.store.read();
        let needle = search_term(query.search.as_ref());

        let mut rows: Vec<Client> = store
            .clients
            .iter()
            .filter(|c| c.firm_id == query.firm_id)
            .filter(|c| query.status.is_none_or(|status| c.status == status))
            .filter(|c| needle.as_deref().is_none_or(|n| c.matches(n)))
            .cloned()
            .collect();

        rows.sort_by(|a, b| {
            let ordering = match query.sort {
                ClientSort::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
                ClientSort::Created => a.created_at.cmp(&b.created_at),
                ClientSort::CaseNumber => a.case_number.cmp(&b.case_number),
            };
            ordered(ordering.then(a.id.cmp(&b.id)), query.order)
        });

        Ok(paginate(rows, query.pagination.as_ref()))
    }
}

impl ClientWriter for InMemoryRepository {
    fn create_client(&self, new_client: &NewClient) -> RepositoryResult<Client> {
        let mut store = self.store.write();
        let id = ClientId::new(Store::next_id(&store.clients, |c| c.id.get()))?;
        let client = Client::from_new(id, new_client.clone(), Utc::now().naive_utc());
        store.clients.push(client.clone());
        Ok(client)
    }

    fn update_client(
        &self,
        id: ClientId,
        firm_id: FirmId,
        updates: &UpdateClient,
    ) -> RepositoryResult<Client> {
        let mut store = self.store.write();
        let client = store
            .clients
            .iter_mut()
            .find(|c| c.id == id && c.firm_id == firm_id)
            .ok_or(RepositoryError::NotFound)?;
        client.apply(updates.clone());
        Ok(client.clone())
    }

    fn delete_client(&self, id: ClientId, firm_id: FirmId) -> RepositoryResult<()> {
        let mut store = self.store.write();
        let before = store.clients.len();
        store
            .clients
            .retain(|c| !(c.id == id && c.firm_id == firm_id));
        if store.clients.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

impl ProviderReader for InMemoryRepository {
    fn get_provider_by_id(
        &self,
        id: ProviderId,
        firm_id: FirmId,
    ) -> RepositoryResult<Option<Provider>> {
        let store = self.store.read();
        Ok(store
            .providers
            .iter()
            .find(|p| p.id == id && p.firm_id == firm_id)
            .cloned())
    }

    fn list_providers(&self, query: ProviderListQuery) -> RepositoryResult<(usize, Vec<Provider>)> {
        let store = self.store.read();
        let needle = search_term(query.search.as_ref());

        let mut rows: Vec<Provider> = store
            .providers
            .iter()
            .filter(|p| p.firm_id == query.firm_id)
            .filter(|p| query.provider_type.is_none_or(|t| p.provider_type == t))
            .filter(|p| query.status.is_none_or(|s| p.status == s))
            .filter(|p| needle.as_deref().is_none_or(|n| p.matches(n)))
            .cloned()
            .collect();

        rows.sort_by(|a, b| {
            let ordering = match query.sort {
                ProviderSort::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
                ProviderSort::SuccessRate => a.success_rate.total_cmp(&b.success_rate),
                ProviderSort::ResponseTime => a.avg_response_days.total_cmp(&b.avg_response_days),
            };
            ordered(ordering.then(a.id.cmp(&b.id)), query.order)
        });

        Ok(paginate(rows, query.pagination.as_ref()))
    }
}

impl ProviderWriter for InMemoryRepository {
    fn create_provider(&self, new_provider: &NewProvider) -> RepositoryResult<Provider> {
        let mut store = self.store.write();
        let id = ProviderId::new(Store::next_id(&store.providers, |p| p.id.get()))?;
        let provider = Provider::from_new(id, new_provider.clone());
        store.providers.push(provider.clone());
        Ok(provider)
    }
}

impl RequestReader for InMemoryRepository {
    fn get_request_by_id(
        &self,
        id: RequestId,
        firm_id: FirmId,
    ) -> RepositoryResult<Option<RecordsRequest>> {
        let store = self.store.read();
        Ok(store
            .requests
            .iter()
            .find(|r| r.id == id && r.firm_id == firm_id)
            .cloned())
    }

    fn list_requests(
        &self,
        query: RequestListQuery,
    ) -> RepositoryResult<(usize, Vec<RecordsRequest>)> {
        let store = self.store.read();
        let needle = search_term(query.search.as_ref());

        // Requests are searched through the names of the people involved.
        let matches_search = |r: &RecordsRequest, needle: &str| {
            r.notes.as_str().to_lowercase().contains(needle)
                || r.request_type.label().to_lowercase().contains(needle)
                || store
                    .clients
                    .iter()
                    .any(|c| c.id == r.client_id && c.matches(needle))
                || store
                    .providers
                    .iter()
                    .any(|p| p.id == r.provider_id && p.matches(needle))
        };

        let mut rows: Vec<RecordsRequest> = store
            .requests
            .iter()
            .filter(|r| r.firm_id == query.firm_id)
            .filter(|r| query.status.is_none_or(|s| r.status == s))
            .filter(|r| query.priority.is_none_or(|p| r.priority == p))
            .filter(|r| query.client_id.is_none_or(|id| r.client_id == id))
            .filter(|r| query.provider_id.is_none_or(|id| r.provider_id == id))
            .filter(|r| needle.as_deref().is_none_or(|n| matches_search(r, n)))
            .cloned()
            .collect();

        rows.sort_by(|a, b| {
            let ordering = match query.sort {
                RequestSort::DueDate => a.due_date.cmp(&b.due_date),
                RequestSort::Priority => a.priority.cmp(&b.priority),
                RequestSort::Created => a.created_at.cmp(&b.created_at),
            };
            ordered(ordering.then(a.id.cmp(&b.id)), query.order)
        });

        Ok(paginate(rows, query.pagination.as_ref()))
    }
}

impl RequestWriter for InMemoryRepository {
    fn create_request(&self, new_request: &NewRecordsRequest) -> RepositoryResult<RecordsRequest> {
        let mut store = self.store.write();
        let id = RequestId::new(Store::next_id(&store.requests, |r| r.id.get()))?;
        let request = RecordsRequest::from_new(id, new_request.clone(), Utc::now().naive_utc());

        if let Some(client) = store
            .clients
            .iter_mut()
            .find(|c| c.id == request.client_id && c.firm_id == request.firm_id)
        {
            client.total_requests += 1;
            client.pending_requests += 1;
        }

        store.requests.push(request.clone());
        Ok(request)
    }

    fn update_request_status(
        &self,
        id: RequestId,
        firm_id: FirmId,
        status: RequestStatus,
    ) -> RepositoryResult<RecordsRequest> {
        let mut store = self.store.write();
        let request = store
            .requests
            .iter_mut()
            .find(|r| r.id == id && r.firm_id == firm_id)
            .ok_or(RepositoryError::NotFound)?;

        let was_closed = request.status.is_closed();
        request.status = status;
        let updated = request.clone();

        if let Some(client) = store
            .clients
            .iter_mut()
            .find(|c| c.id == updated.client_id && c.firm_id == firm_id)
        {
            match (was_closed, status.is_closed()) {
                (false, true) => client.pending_requests = client.pending_requests.saturating_sub(1),
                (true, false) => client.pending_requests += 1,
                _ => {}
            }
        }

        Ok(updated)
    }
}

impl DocumentReader for InMemoryRepository {
    fn get_document_by_id(
        &self,
        id: DocumentId,
        firm_id: FirmId,
    ) -> RepositoryResult<Option<Document>> {
        let store = self.store.read();
        Ok(store
            .documents
            .iter()
            .find(|d| d.id == id && d.firm_id == firm_id)
            .cloned())
    }

    fn list_documents(&self, query: DocumentListQuery) -> RepositoryResult<(usize, Vec<Document>)> {
        let store = self.store.read();
        let needle = search_term(query.search.as_ref());

        let mut rows: Vec<Document> = store
            .documents
            .iter()
            .filter(|d| d.firm_id == query.firm_id)
            .filter(|d| query.category.is_none_or(|c| d.category == c))
            .filter(|d| query.status.is_none_or(|s| d.status == s))
            .filter(|d| query.client_id.is_none_or(|id| d.client_id == Some(id)))
            .filter(|d| needle.as_deref().is_none_or(|n| d.matches(n)))
            .cloned()
            .collect();

        rows.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at).then(a.id.cmp(&b.id)));

        Ok(paginate(rows, query.pagination.as_ref()))
    }
}

impl DocumentWriter for InMemoryRepository {
    fn delete_document(&self, id: DocumentId, firm_id: FirmId) -> RepositoryResult<()> {
        let mut store = self.store.write();
        let before = store.documents.len();
        store
            .documents
            .retain(|d| !(d.id == id && d.firm_id == firm_id));
        if store.documents.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
