//! Records request listing, creation and status changes.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::client::ClientStatus;
use crate::domain::provider::ProviderStatus;
use crate::domain::request::{RecordsRequest, RequestStatus};
use crate::domain::types::{FirmId, RequestId};
use crate::dto::SelectOption;
use crate::dto::requests::{RequestFilters, RequestRow, RequestsPageData, RequestsQuery};
use crate::forms::FormError;
use crate::forms::request::{BulkStatusForm, BulkStatusPayload, NewRequestForm, NewRequestPayload, RequestStatusForm};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::policy::{Feature, authorize};
use crate::repository::{
    ClientListQuery, ClientReader, ProviderListQuery, ProviderReader, RequestListQuery,
    RequestReader, RequestSort, RequestWriter,
};
use crate::services::{ServiceError, ServiceResult};

/// Joins requests with client and provider names.
pub(crate) fn request_rows<R>(
    repo: &R,
    firm_id: FirmId,
    requests: Vec<RecordsRequest>,
    today: NaiveDate,
) -> ServiceResult<Vec<RequestRow>>
where
    R: ClientReader + ProviderReader + ?Sized,
{
    let (_, clients) = repo.list_clients(ClientListQuery::new(firm_id))?;
    let (_, providers) = repo.list_providers(ProviderListQuery::new(firm_id))?;

    let client_names: HashMap<_, _> = clients
        .into_iter()
        .map(|c| (c.id, c.name.into_inner()))
        .collect();
    let provider_names: HashMap<_, _> = providers
        .into_iter()
        .map(|p| (p.id, p.name.into_inner()))
        .collect();

    Ok(requests
        .into_iter()
        .map(|request| RequestRow {
            client_name: client_names
                .get(&request.client_id)
                .cloned()
                .unwrap_or_else(|| "Removed client".to_string()),
            provider_name: provider_names
                .get(&request.provider_id)
                .cloned()
                .unwrap_or_else(|| "Unknown provider".to_string()),
            type_label: request.request_type.label(),
            status_label: request.status.label(),
            priority_label: request.priority.label(),
            overdue: request.is_overdue(today),
            request,
        })
        .collect())
}

/// Loads the filtered requests list along with the options for a new request.
pub fn list_requests<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: &RequestsQuery,
    today: NaiveDate,
) -> ServiceResult<RequestsPageData>
where
    R: ClientReader + ProviderReader + RequestReader + ?Sized,
{
    authorize(user, Feature::ViewRequests)?;

    let firm_id = FirmId::new(user.firm_id)?;
    let filters = RequestFilters::from(query);

    let mut list_query = RequestListQuery::new(firm_id)
        .sort(filters.sort.unwrap_or(RequestSort::DueDate), filters.order)
        .paginate(filters.page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(term) = &filters.search {
        list_query = list_query.search(term.clone());
    }
    if let Some(status) = filters.status {
        list_query = list_query.status(status);
    }
    if let Some(priority) = filters.priority {
        list_query = list_query.priority(priority);
    }

    let (total, requests) = repo.list_requests(list_query).map_err(|err| {
        log::error!("Failed to list requests: {err}");
        err
    })?;
    let rows = request_rows(repo, firm_id, requests, today)?;

    let (_, clients) = repo.list_clients(ClientListQuery::new(firm_id))?;
    let client_options = clients
        .iter()
        .filter(|c| c.status != ClientStatus::Inactive)
        .map(|c| SelectOption::new(c.id, format!("{} ({})", c.name, c.case_number)))
        .collect();

    let (_, providers) =
        repo.list_providers(ProviderListQuery::new(firm_id).status(ProviderStatus::Active))?;
    let provider_options = providers
        .iter()
        .map(|p| SelectOption::new(p.id, p.name.as_str()))
        .collect();

    Ok(RequestsPageData {
        requests: Paginated::new(rows, filters.page, total, DEFAULT_ITEMS_PER_PAGE),
        filters,
        client_options,
        provider_options,
    })
}

/// Creates a pending request after checking that both parties exist.
pub fn create_request<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: NewRequestForm,
) -> ServiceResult<RecordsRequest>
where
    R: ClientReader + ProviderReader + RequestWriter + ?Sized,
{
    authorize(user, Feature::ManageRequests)?;

    let firm_id = FirmId::new(user.firm_id)?;
    let payload = NewRequestPayload::try_from(form)?;

    if repo.get_client_by_id(payload.client_id, firm_id)?.is_none() {
        return Err(FormError::InvalidClientId.into());
    }
    if repo.get_provider_by_id(payload.provider_id, firm_id)?.is_none() {
        return Err(FormError::InvalidProviderId.into());
    }

    let request = repo
        .create_request(&payload.into_domain(firm_id))
        .map_err(|err| {
            log::error!("Failed to create request: {err}");
            err
        })?;

    log::info!("Request {} created by {}", request.id, user.email);
    Ok(request)
}

/// Changes the status of one request. Every transition is allowed.
pub fn update_status<R>(
    repo: &R,
    user: &AuthenticatedUser,
    request_id: i32,
    form: RequestStatusForm,
) -> ServiceResult<RecordsRequest>
where
    R: RequestWriter + ?Sized,
{
    authorize(user, Feature::ManageRequests)?;

    let firm_id = FirmId::new(user.firm_id)?;
    let request_id = RequestId::new(request_id).map_err(|_| ServiceError::NotFound)?;
    let status = RequestStatus::try_from(form)?;

    repo.update_request_status(request_id, firm_id, status)
        .map_err(|err| {
            log::error!("Failed to update request {request_id}: {err}");
            err.into()
        })
}

/// Applies one status to every selected request and returns how many changed.
pub fn bulk_update_status<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: BulkStatusForm,
) -> ServiceResult<usize>
where
    R: RequestWriter + ?Sized,
{
    authorize(user, Feature::ManageRequests)?;

    let firm_id = FirmId::new(user.firm_id)?;
    let payload = BulkStatusPayload::try_from(form)?;

    let mut updated = 0;
    for request_id in payload.request_ids {
        match repo.update_request_status(request_id, firm_id, payload.status) {
            Ok(_) => updated += 1,
            Err(err) => log::warn!("Skipped request {request_id} in bulk update: {err}"),
        }
    }
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::Role;
    use crate::domain::request::RequestPriority;
    use crate::services::test_support::{repo, today, user};

    fn new_request_form(client_id: i32, provider_id: i32) -> NewRequestForm {
        NewRequestForm {
            client_id,
            provider_id,
            request_type: "imaging".into(),
            priority: "urgent".into(),
            due_date: "2025-07-01".into(),
            notes: "Films <script>x</script>from 2024".into(),
        }
    }

    #[test]
    fn list_filters_by_status_and_joins_names() {
        let repo = repo();
        let query = RequestsQuery {
            status: Some("completed".into()),
            ..Default::default()
        };

        let data = list_requests(&repo, &user(Role::Viewer), &query, today()).unwrap();

        assert_eq!(data.requests.total, 4);
        assert!(
            data.requests
                .items
                .iter()
                .all(|row| row.request.status == RequestStatus::Completed && !row.overdue)
        );
        assert!(data.requests.items.iter().any(|row| row.client_name == "John Smith"));
        assert!(!data.provider_options.is_empty());
    }

    #[test]
    fn unknown_filter_values_are_ignored() {
        let repo = repo();
        let query = RequestsQuery {
            status: Some("bogus".into()),
            sort: Some("priority".into()),
            order: Some("desc".into()),
            ..Default::default()
        };

        let data = list_requests(&repo, &user(Role::Admin), &query, today()).unwrap();

        assert_eq!(data.requests.total, 11);
        assert_eq!(
            data.requests.items[0].request.priority,
            RequestPriority::Urgent
        );
    }

    #[test]
    fn create_request_sanitizes_notes_and_counts_for_client() {
        let repo = repo();
        let admin = user(Role::Paralegal);

        let request = create_request(&repo, &admin, new_request_form(7, 3)).unwrap();

        assert_eq!(request.status, RequestStatus::Pending);
        assert!(!request.notes.as_str().contains("<script>"));
        let client = repo
            .get_client_by_id(request.client_id, request.firm_id)
            .unwrap()
            .unwrap();
        assert_eq!(client.total_requests, 1);
        assert_eq!(client.pending_requests, 1);
    }

    #[test]
    fn create_request_rejects_unknown_client() {
        let repo = repo();
        let result = create_request(&repo, &user(Role::Admin), new_request_form(99, 1));
        assert!(matches!(
            result,
            Err(ServiceError::Validation(FormError::InvalidClientId))
        ));
    }

    #[test]
    fn viewer_cannot_change_status() {
        let repo = repo();
        let form = RequestStatusForm {
            status: "completed".into(),
        };
        let result = update_status(&repo, &user(Role::Viewer), 1, form);
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn any_status_may_follow_any_other() {
        let repo = repo();
        let attorney = user(Role::Attorney);

        let form = RequestStatusForm {
            status: "cancelled".into(),
        };
        let updated = update_status(&repo, &attorney, 2, form).unwrap();
        assert_eq!(updated.status, RequestStatus::Cancelled);

        let form = RequestStatusForm {
            status: "pending".into(),
        };
        let updated = update_status(&repo, &attorney, 2, form).unwrap();
        assert_eq!(updated.status, RequestStatus::Pending);
    }

    #[test]
    fn bulk_update_skips_missing_rows() {
        let repo = repo();
        let form = BulkStatusForm {
            request_ids: vec![1, 4, 4, 500],
            status: "in_progress".into(),
        };

        let updated = bulk_update_status(&repo, &user(Role::Admin), form).unwrap();

        assert_eq!(updated, 2);
    }
}
