use std::cmp::Ordering;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::request::{RecordsRequest, RequestPriority, RequestStatus, RequestType};
use crate::domain::types::FirmId;
use crate::dto::reports::{CountRow, ReportsPageData};
use crate::policy::{Feature, authorize};
use crate::repository::{ProviderListQuery, ProviderReader, RequestListQuery, RequestReader};
use crate::services::ServiceResult;

fn breakdown<T: Copy + PartialEq>(
    requests: &[RecordsRequest],
    variants: &[T],
    key_of: impl Fn(&RecordsRequest) -> T,
    describe: impl Fn(T) -> (&'static str, &'static str),
) -> Vec<CountRow> {
    let total = requests.len();
    variants
        .iter()
        .map(|&variant| {
            let count = requests.iter().filter(|r| key_of(r) == variant).count();
            let (key, label) = describe(variant);
            CountRow {
                key,
                label,
                count,
                share: if total == 0 {
                    0.0
                } else {
                    count as f32 * 100.0 / total as f32
                },
            }
        })
        .collect()
}

/// Request counts by status, type and priority plus provider performance.
pub fn load_reports<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<ReportsPageData>
where
    R: ProviderReader + RequestReader + ?Sized,
{
    authorize(user, Feature::ViewReports)?;

    let firm_id = FirmId::new(user.firm_id)?;
    let (_, requests) = repo.list_requests(RequestListQuery::new(firm_id)).map_err(|err| {
        log::error!("Failed to load requests for reports: {err}");
        err
    })?;
    let (_, mut providers) = repo.list_providers(ProviderListQuery::new(firm_id))?;

    providers.sort_by(|a, b| {
        b.success_rate
            .partial_cmp(&a.success_rate)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.name.as_str().cmp(b.name.as_str()))
    });

    Ok(ReportsPageData {
        total_requests: requests.len(),
        by_status: breakdown(&requests, RequestStatus::ALL, |r| r.status, |s| {
            (s.as_str(), s.label())
        }),
        by_type: breakdown(&requests, RequestType::ALL, |r| r.request_type, |t| {
            (t.as_str(), t.label())
        }),
        by_priority: breakdown(&requests, RequestPriority::ALL, |r| r.priority, |p| {
            (p.as_str(), p.label())
        }),
        provider_performance: providers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::Role;
    use crate::services::ServiceError;
    use crate::services::test_support::{repo, user};

    #[test]
    fn breakdowns_cover_every_request() {
        let repo = repo();
        let data = load_reports(&repo, &user(Role::Viewer)).unwrap();

        for rows in [&data.by_status, &data.by_type, &data.by_priority] {
            assert_eq!(rows.iter().map(|r| r.count).sum::<usize>(), data.total_requests);
        }
        let completed = data.by_status.iter().find(|r| r.key == "completed").unwrap();
        assert_eq!(completed.count, 4);
    }

    #[test]
    fn providers_are_ranked_by_success_rate() {
        let repo = repo();
        let data = load_reports(&repo, &user(Role::Admin)).unwrap();

        let rates: Vec<f32> = data
            .provider_performance
            .iter()
            .map(|p| p.success_rate)
            .collect();
        assert!(rates.windows(2).all(|pair| pair[0] >= pair[1]));
    }

    #[test]
    fn paralegal_has_no_reports() {
        let repo = repo();
        assert!(matches!(
            load_reports(&repo, &user(Role::Paralegal)),
            Err(ServiceError::Unauthorized)
        ));
    }
}
