//! Client list, detail, edit and export use cases.

use chrono::NaiveDate;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::client::Client;
use crate::domain::types::{ClientId, FirmId};
use crate::dto::ExportFile;
use crate::dto::clients::{
    ClientEditData, ClientFilters, ClientPageData, ClientsPageData, ClientsQuery,
};
use crate::export::{attachment_name, clients_to_csv};
use crate::forms::client::{ClientForm, ClientPayload};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::policy::{Feature, authorize};
use crate::repository::{
    ClientListQuery, ClientReader, ClientSort, ClientWriter, DocumentListQuery, DocumentReader,
    ProviderReader, RequestListQuery, RequestReader,
};
use crate::services::requests::request_rows;
use crate::services::{ServiceError, ServiceResult};

fn list_query(firm_id: FirmId, filters: &ClientFilters) -> ClientListQuery {
    let mut query =
        ClientListQuery::new(firm_id).sort(filters.sort.unwrap_or(ClientSort::Name), filters.order);
    if let Some(term) = &filters.search {
        query = query.search(term.clone());
    }
    if let Some(status) = filters.status {
        query = query.status(status);
    }
    query
}

fn client_id(raw: i32) -> ServiceResult<ClientId> {
    ClientId::new(raw).map_err(|_| ServiceError::NotFound)
}

fn find_client<R>(repo: &R, id: ClientId, firm_id: FirmId) -> ServiceResult<Client>
where
    R: ClientReader + ?Sized,
{
    repo.get_client_by_id(id, firm_id)
        .map_err(|err| {
            log::error!("Failed to load client {id}: {err}");
            err
        })?
        .ok_or(ServiceError::NotFound)
}

/// Loads one page of clients matching the search box and filters.
pub fn list_clients<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: &ClientsQuery,
) -> ServiceResult<ClientsPageData>
where
    R: ClientReader + ?Sized,
{
    authorize(user, Feature::ViewClients)?;

    let firm_id = FirmId::new(user.firm_id)?;
    let filters = ClientFilters::from(query);

    let (total, clients) = repo
        .list_clients(list_query(firm_id, &filters).paginate(filters.page, DEFAULT_ITEMS_PER_PAGE))
        .map_err(|err| {
            log::error!("Failed to list clients: {err}");
            err
        })?;

    Ok(ClientsPageData {
        clients: Paginated::new(clients, filters.page, total, DEFAULT_ITEMS_PER_PAGE),
        filters,
    })
}

/// Loads a client with their requests and documents.
pub fn load_client<R>(
    repo: &R,
    user: &AuthenticatedUser,
    client_id_raw: i32,
    today: NaiveDate,
) -> ServiceResult<ClientPageData>
where
    R: ClientReader + ProviderReader + RequestReader + DocumentReader + ?Sized,
{
    authorize(user, Feature::ViewClients)?;

    let firm_id = FirmId::new(user.firm_id)?;
    let id = client_id(client_id_raw)?;
    let client = find_client(repo, id, firm_id)?;

    let (_, requests) = repo.list_requests(RequestListQuery::new(firm_id).client(id))?;
    let requests = request_rows(repo, firm_id, requests, today)?;
    let (_, documents) = repo.list_documents(DocumentListQuery::new(firm_id).client(id))?;

    Ok(ClientPageData {
        client,
        requests,
        documents,
    })
}

/// Loads the edit form prefilled with the stored values.
pub fn load_client_form<R>(
    repo: &R,
    user: &AuthenticatedUser,
    client_id_raw: i32,
) -> ServiceResult<ClientEditData>
where
    R: ClientReader + ?Sized,
{
    authorize(user, Feature::ManageClients)?;

    let firm_id = FirmId::new(user.firm_id)?;
    let client = find_client(repo, client_id(client_id_raw)?, firm_id)?;
    let form = ClientForm::from(&client);

    Ok(ClientEditData { client, form })
}

/// Validates the add-client form and stores the new client.
pub fn add_client<R>(repo: &R, user: &AuthenticatedUser, form: ClientForm) -> ServiceResult<Client>
where
    R: ClientWriter + ?Sized,
{
    authorize(user, Feature::ManageClients)?;

    let firm_id = FirmId::new(user.firm_id)?;
    let payload = ClientPayload::try_from(form)?;

    let client = repo
        .create_client(&payload.into_new(firm_id))
        .map_err(|err| {
            log::error!("Failed to add a client: {err}");
            err
        })?;

    log::info!("Client {} added by {}", client.id, user.email);
    Ok(client)
}

pub fn update_client<R>(
    repo: &R,
    user: &AuthenticatedUser,
    client_id_raw: i32,
    form: ClientForm,
) -> ServiceResult<Client>
where
    R: ClientWriter + ?Sized,
{
    authorize(user, Feature::ManageClients)?;

    let firm_id = FirmId::new(user.firm_id)?;
    let id = client_id(client_id_raw)?;
    let payload = ClientPayload::try_from(form)?;

    repo.update_client(id, firm_id, &payload.into_update())
        .map_err(|err| {
            log::error!("Failed to update client {id}: {err}");
            err.into()
        })
}

/// Deletes only the client record; requests and documents are kept.
pub fn delete_client<R>(repo: &R, user: &AuthenticatedUser, client_id_raw: i32) -> ServiceResult<()>
where
    R: ClientWriter + ?Sized,
{
    authorize(user, Feature::ManageClients)?;

    let firm_id = FirmId::new(user.firm_id)?;
    let id = client_id(client_id_raw)?;

    repo.delete_client(id, firm_id).map_err(|err| {
        log::error!("Failed to delete client {id}: {err}");
        err
    })?;

    log::info!("Client {id} deleted by {}", user.email);
    Ok(())
}

/// CSV of every client matching the current filters, unpaginated.
pub fn export_clients<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: &ClientsQuery,
    today: NaiveDate,
) -> ServiceResult<ExportFile>
where
    R: ClientReader + ?Sized,
{
    authorize(user, Feature::ExportData)?;

    let firm_id = FirmId::new(user.firm_id)?;
    let filters = ClientFilters::from(query);

    let (_, clients) = repo.list_clients(list_query(firm_id, &filters))?;
    let body = clients_to_csv(&clients).map_err(|err| {
        log::error!("Failed to export clients: {err}");
        err
    })?;

    Ok(ExportFile {
        file_name: attachment_name("clients", today, "csv"),
        content_type: "text/csv; charset=utf-8",
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::Role;
    use crate::domain::client::ClientStatus;
    use crate::services::test_support::{repo, today, user};

    fn form(name: &str) -> ClientForm {
        ClientForm {
            name: name.into(),
            email: Some("new.client@example.com".into()),
            phone: Some("555.222.3333".into()),
            date_of_birth: Some("1980-02-29".into()),
            case_number: "CASE-2025-100".into(),
            address: None,
            status: "pending".into(),
        }
    }

    #[test]
    fn search_matches_name_email_and_case_number() {
        let repo = repo();
        let viewer = user(Role::Viewer);

        for term in ["garcia", "r.johnson@", "2023-017"] {
            let query = ClientsQuery {
                search: Some(term.into()),
                ..Default::default()
            };
            let data = list_clients(&repo, &viewer, &query).unwrap();
            assert_eq!(data.clients.total, 1, "term {term}");
        }
    }

    #[test]
    fn status_filter_and_sort_apply() {
        let repo = repo();
        let query = ClientsQuery {
            status: Some("active".into()),
            sort: Some("name".into()),
            order: Some("desc".into()),
            ..Default::default()
        };

        let data = list_clients(&repo, &user(Role::Admin), &query).unwrap();

        assert_eq!(data.clients.total, 5);
        assert_eq!(data.clients.items[0].name.as_str(), "Sarah Wilson");
        assert!(
            data.clients
                .items
                .iter()
                .all(|c| c.status == ClientStatus::Active)
        );
    }

    #[test]
    fn detail_includes_requests_and_documents() {
        let repo = repo();
        let data = load_client(&repo, &user(Role::Viewer), 1, today()).unwrap();

        assert_eq!(data.client.name.as_str(), "John Smith");
        assert_eq!(data.requests.len(), 3);
        assert_eq!(data.documents.len(), 2);
    }

    #[test]
    fn missing_client_is_not_found() {
        let repo = repo();
        assert!(matches!(
            load_client(&repo, &user(Role::Admin), 42, today()),
            Err(ServiceError::NotFound)
        ));
        assert!(matches!(
            load_client(&repo, &user(Role::Admin), -1, today()),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn add_client_formats_phone() {
        let repo = repo();
        let client = add_client(&repo, &user(Role::Paralegal), form("Nina Patel")).unwrap();

        assert_eq!(client.phone.unwrap().as_str(), "(555) 222-3333");
        assert_eq!(client.status, ClientStatus::Pending);
        assert_eq!(client.total_requests, 0);
    }

    #[test]
    fn invalid_form_returns_field_errors() {
        let repo = repo();
        let mut bad = form("");
        bad.email = Some("not-an-email".into());

        let err = add_client(&repo, &user(Role::Admin), bad).unwrap_err();

        let ServiceError::Validation(err) = err else {
            panic!("expected validation error, got {err:?}");
        };
        let fields = err.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn viewer_cannot_manage_clients() {
        let repo = repo();
        let viewer = user(Role::Viewer);
        assert!(matches!(
            add_client(&repo, &viewer, form("Nina Patel")),
            Err(ServiceError::Unauthorized)
        ));
        assert!(matches!(
            delete_client(&repo, &viewer, 1),
            Err(ServiceError::Unauthorized)
        ));
    }

    #[test]
    fn delete_keeps_requests_and_documents() {
        let repo = repo();
        let admin = user(Role::Admin);

        delete_client(&repo, &admin, 1).unwrap();

        assert!(matches!(
            load_client(&repo, &admin, 1, today()),
            Err(ServiceError::NotFound)
        ));
        let firm_id = FirmId::new(1).unwrap();
        let (total, _) = repo
            .list_requests(RequestListQuery::new(firm_id).client(ClientId::new(1).unwrap()))
            .unwrap();
        assert_eq!(total, 3);
    }

    #[test]
    fn update_applies_changes() {
        let repo = repo();
        let admin = user(Role::Attorney);
        let mut edit = load_client_form(&repo, &admin, 2).unwrap().form;
        edit.status = "inactive".into();

        let updated = update_client(&repo, &admin, 2, edit).unwrap();

        assert_eq!(updated.status, ClientStatus::Inactive);
        assert_eq!(updated.name.as_str(), "Maria Garcia");
    }

    #[test]
    fn export_has_header_and_one_row_per_client() {
        let repo = repo();
        let file =
            export_clients(&repo, &user(Role::Attorney), &ClientsQuery::default(), today())
                .unwrap();

        let text = String::from_utf8(file.body).unwrap();
        assert_eq!(text.lines().count(), 9);
        assert!(text.starts_with("id,name,email"));
        assert_eq!(file.file_name, "clients-2025-06-01.csv");
    }

    #[test]
    fn paralegal_cannot_export() {
        let repo = repo();
        let result = export_clients(
            &repo,
            &user(Role::Paralegal),
            &ClientsQuery::default(),
            today(),
        );
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }
}

#[cfg(all(test, feature = "test-mocks"))]
mod mock_tests {
    use super::*;
    use crate::domain::auth::Role;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::user;

    #[test]
    fn list_passes_firm_and_page_to_repository() {
        let mut repo = MockRepository::new();
        repo.expect_list_clients()
            .withf(|query| {
                query.firm_id.get() == 1
                    && query.search.as_deref() == Some("smith")
                    && query.pagination.as_ref().is_some_and(|p| p.page == 2)
            })
            .times(1)
            .returning(|_| Ok((0, Vec::new())));

        let query = ClientsQuery {
            search: Some(" smith ".into()),
            page: Some(2),
            ..Default::default()
        };
        let data = list_clients(&repo, &user(Role::Admin), &query).unwrap();

        assert_eq!(data.clients.total, 0);
    }

    #[test]
    fn delete_of_missing_client_propagates_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_delete_client()
            .times(1)
            .returning(|_, _| Err(RepositoryError::NotFound));

        let result = delete_client(&repo, &user(Role::Admin), 5);

        assert!(matches!(
            result,
            Err(ServiceError::Repository(RepositoryError::NotFound))
        ));
    }

    #[test]
    fn unauthorized_user_never_reaches_repository() {
        let mut repo = MockRepository::new();
        repo.expect_create_client().times(0);

        let result = add_client(&repo, &user(Role::Viewer), ClientForm::default());

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }
}
