use chrono::NaiveDate;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::provider::Provider;
use crate::domain::types::{FirmId, ProviderId};
use crate::dto::providers::{ProviderFilters, ProviderPageData, ProvidersPageData, ProvidersQuery};
use crate::forms::provider::{AddProviderForm, AddProviderPayload};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::policy::{Feature, authorize};
use crate::repository::{
    ClientReader, ProviderListQuery, ProviderReader, ProviderSort, ProviderWriter,
    RequestListQuery, RequestReader, RequestSort, SortOrder,
};
use crate::services::requests::request_rows;
use crate::services::{ServiceError, ServiceResult};

pub fn list_providers<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: &ProvidersQuery,
) -> ServiceResult<ProvidersPageData>
where
    R: ProviderReader + ?Sized,
{
    authorize(user, Feature::ViewProviders)?;

    let firm_id = FirmId::new(user.firm_id)?;
    let filters = ProviderFilters::from(query);

    let mut list_query = ProviderListQuery::new(firm_id)
        .sort(filters.sort.unwrap_or(ProviderSort::Name), filters.order)
        .paginate(filters.page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(term) = &filters.search {
        list_query = list_query.search(term.clone());
    }
    if let Some(provider_type) = filters.provider_type {
        list_query = list_query.provider_type(provider_type);
    }
    if let Some(status) = filters.status {
        list_query = list_query.status(status);
    }

    let (total, providers) = repo.list_providers(list_query).map_err(|err| {
        log::error!("Failed to list providers: {err}");
        err
    })?;

    Ok(ProvidersPageData {
        providers: Paginated::new(providers, filters.page, total, DEFAULT_ITEMS_PER_PAGE),
        filters,
    })
}

/// Loads a provider with its request history, newest first.
pub fn load_provider<R>(
    repo: &R,
    user: &AuthenticatedUser,
    provider_id: i32,
    today: NaiveDate,
) -> ServiceResult<ProviderPageData>
where
    R: ClientReader + ProviderReader + RequestReader + ?Sized,
{
    authorize(user, Feature::ViewProviders)?;

    let firm_id = FirmId::new(user.firm_id)?;
    let id = ProviderId::new(provider_id).map_err(|_| ServiceError::NotFound)?;

    let provider = repo
        .get_provider_by_id(id, firm_id)
        .map_err(|err| {
            log::error!("Failed to load provider {id}: {err}");
            err
        })?
        .ok_or(ServiceError::NotFound)?;

    let (_, requests) = repo.list_requests(
        RequestListQuery::new(firm_id)
            .provider(id)
            .sort(RequestSort::Created, SortOrder::Desc),
    )?;
    let history = request_rows(repo, firm_id, requests, today)?;

    Ok(ProviderPageData { provider, history })
}

/// Adds a provider. Its metrics start at zero and are never recomputed.
pub fn add_provider<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: AddProviderForm,
) -> ServiceResult<Provider>
where
    R: ProviderWriter + ?Sized,
{
    authorize(user, Feature::ManageProviders)?;

    let firm_id = FirmId::new(user.firm_id)?;
    let payload = AddProviderPayload::try_from(form)?;

    let provider = repo
        .create_provider(&payload.into_domain(firm_id))
        .map_err(|err| {
            log::error!("Failed to add a provider: {err}");
            err
        })?;

    log::info!("Provider {} added by {}", provider.id, user.email);
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::Role;
    use crate::domain::provider::{ProviderStatus, ProviderType};
    use crate::services::test_support::{repo, today, user};

    #[test]
    fn sorts_by_success_rate_descending() {
        let repo = repo();
        let query = ProvidersQuery {
            sort: Some("success_rate".into()),
            order: Some("desc".into()),
            ..Default::default()
        };

        let data = list_providers(&repo, &user(Role::Viewer), &query).unwrap();

        assert_eq!(data.providers.items[0].name.as_str(), "QuickLab Diagnostics");
        assert_eq!(data.providers.total, 6);
    }

    #[test]
    fn filters_by_type_and_status() {
        let repo = repo();
        let query = ProvidersQuery {
            provider_type: Some("pharmacy".into()),
            status: Some("active".into()),
            ..Default::default()
        };

        let data = list_providers(&repo, &user(Role::Viewer), &query).unwrap();

        assert_eq!(data.providers.total, 0);
    }

    #[test]
    fn detail_lists_history() {
        let repo = repo();
        let data = load_provider(&repo, &user(Role::Viewer), 1, today()).unwrap();

        assert_eq!(data.provider.provider_type, ProviderType::Hospital);
        assert_eq!(data.history.len(), 3);
        assert!(
            data.history
                .windows(2)
                .all(|pair| pair[0].request.created_at >= pair[1].request.created_at)
        );
    }

    #[test]
    fn added_provider_starts_active_without_metrics() {
        let repo = repo();
        let form = AddProviderForm {
            name: "Northside Orthopedics".into(),
            provider_type: "clinic".into(),
            email: Some("records@northside.example.com".into()),
            phone: None,
            address: Some("3 North Street".into()),
        };

        let provider = add_provider(&repo, &user(Role::Attorney), form).unwrap();

        assert_eq!(provider.status, ProviderStatus::Active);
        assert_eq!(provider.success_rate, 0.0);
    }

    #[test]
    fn paralegal_cannot_add_providers() {
        let repo = repo();
        let result = add_provider(&repo, &user(Role::Paralegal), AddProviderForm::default());
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }
}
