//! Mock repository implementations for isolating services in tests.

use mockall::mock;

use crate::domain::client::{Client, NewClient, UpdateClient};
use crate::domain::document::Document;
use crate::domain::firm::{Firm, NewFirm};
use crate::domain::provider::{NewProvider, Provider};
use crate::domain::request::{NewRecordsRequest, RecordsRequest, RequestStatus};
use crate::domain::types::{ClientId, DocumentId, FirmId, ProviderId, RequestId};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    ClientListQuery, ClientReader, ClientWriter, DocumentListQuery, DocumentReader,
    DocumentWriter, FirmReader, FirmWriter, ProviderListQuery, ProviderReader, ProviderWriter,
    RequestListQuery, RequestReader, RequestWriter,
};

mock! {
    pub Repository {}

    impl FirmReader for Repository {
        fn get_firm_by_id(&self, id: FirmId) -> RepositoryResult<Option<Firm>>;
    }

    impl FirmWriter for Repository {
        fn create_firm(&self, new_firm: &NewFirm) -> RepositoryResult<Firm>;
    }

    impl ClientReader for Repository {
        fn get_client_by_id(&self, id: ClientId, firm_id: FirmId) -> RepositoryResult<Option<Client>>;
        fn list_clients(&self, query: ClientListQuery) -> RepositoryResult<(usize, Vec<Client>)>;
    }

    impl ClientWriter for Repository {
        fn create_client(&self, new_client: &NewClient) -> RepositoryResult<Client>;
        fn update_client(
            &self,
            id: ClientId,
            firm_id: FirmId,
            updates: &UpdateClient,
        ) -> RepositoryResult<Client>;
        fn delete_client(&self, id: ClientId, firm_id: FirmId) -> RepositoryResult<()>;
    }

    impl ProviderReader for Repository {
        fn get_provider_by_id(
            &self,
            id: ProviderId,
            firm_id: FirmId,
        ) -> RepositoryResult<Option<Provider>>;
        fn list_providers(&self, query: ProviderListQuery) -> RepositoryResult<(usize, Vec<Provider>)>;
    }

    impl ProviderWriter for Repository {
        fn create_provider(&self, new_provider: &NewProvider) -> RepositoryResult<Provider>;
    }

    impl RequestReader for Repository {
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

    impl RequestWriter for Repository {
        fn create_request(&self, new_request: &NewRecordsRequest) -> RepositoryResult<RecordsRequest>;
        fn update_request_status(
            &self,
            id: RequestId,
            firm_id: FirmId,
            status: RequestStatus,
        ) -> RepositoryResult<RecordsRequest>;
    }

    impl DocumentReader for Repository {
        fn get_document_by_id(
            &self,
            id: DocumentId,
            firm_id: FirmId,
        ) -> RepositoryResult<Option<Document>>;
        fn list_documents(&self, query: DocumentListQuery) -> RepositoryResult<(usize, Vec<Document>)>;
    }

    impl DocumentWriter for Repository {
        fn delete_document(&self, id: DocumentId, firm_id: FirmId) -> RepositoryResult<()>;
    }
}
