//! Services backing the JSON API.

use crate::domain::auth::AuthenticatedUser;
use crate::domain::types::FirmId;
use crate::dto::api::{ClientsQuery, ClientsResponse};
use crate::dto::normalize_search;
use crate::pagination::DEFAULT_ITEMS_PER_PAGE;
use crate::policy::{Feature, authorize};
use crate::repository::{ClientListQuery, ClientReader};
use crate::services::ServiceResult;

/// Lists clients for the API, optionally filtered by a search query.
pub fn list_clients<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: ClientsQuery,
) -> ServiceResult<ClientsResponse>
where
    R: ClientReader + ?Sized,
{
    authorize(user, Feature::ViewClients)?;

    let firm_id = FirmId::new(user.firm_id)?;
    let page = query.page.unwrap_or(1).max(1);

    let mut list_query = ClientListQuery::new(firm_id).paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(term) = normalize_search(query.search.as_deref()) {
        list_query = list_query.search(term);
    }

    let (total, clients) = repo.list_clients(list_query).map_err(|err| {
        log::error!("Failed to list clients: {err}");
        err
    })?;

    Ok(ClientsResponse {
        total,
        page,
        clients,
    })
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::domain::auth::Role;
    use crate::repository::mock::MockRepository;
    use crate::services::ServiceError;
    use crate::services::test_support::user;

    #[test]
    fn blank_search_lists_everything() {
        let mut repo = MockRepository::new();
        repo.expect_list_clients()
            .withf(|query| query.search.is_none() && query.firm_id.get() == 1)
            .times(1)
            .returning(|_| Ok((3, Vec::new())));

        let query = ClientsQuery {
            search: Some("   ".into()),
            page: None,
        };
        let response = list_clients(&repo, &user(Role::Viewer), query).unwrap();

        assert_eq!(response.total, 3);
        assert_eq!(response.page, 1);
    }

    #[test]
    fn user_from_another_firm_is_scoped_to_it() {
        let mut repo = MockRepository::new();
        repo.expect_list_clients()
            .withf(|query| query.firm_id.get() == 9)
            .times(1)
            .returning(|_| Ok((0, Vec::new())));

        let mut other = user(Role::Admin);
        other.firm_id = 9;
        list_clients(&repo, &other, ClientsQuery::default()).unwrap();
    }

    #[test]
    fn invalid_firm_is_rejected() {
        let mut repo = MockRepository::new();
        repo.expect_list_clients().times(0);

        let mut broken = user(Role::Admin);
        broken.firm_id = 0;
        let result = list_clients(&repo, &broken, ClientsQuery::default());

        assert!(matches!(result, Err(ServiceError::TypeConstraint(_))));
    }
}
