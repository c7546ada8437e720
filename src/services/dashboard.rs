use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::auth::AuthenticatedUser;
use crate::domain::dashboard::DashboardMetrics;
use crate::domain::types::FirmId;
use crate::dto::ExportFile;
use crate::dto::dashboard::{DashboardPageData, RECENT_REQUESTS};
use crate::export::{attachment_name, metrics_to_json};
use crate::policy::{Feature, authorize};
use crate::repository::{
    ClientListQuery, ClientReader, DocumentListQuery, DocumentReader, ProviderListQuery,
    ProviderReader, RequestListQuery, RequestReader, RequestSort, SortOrder,
};
use crate::services::ServiceResult;
use crate::services::requests::request_rows;

fn compute_metrics<R>(repo: &R, firm_id: FirmId, today: NaiveDate) -> ServiceResult<DashboardMetrics>
where
    R: ClientReader + ProviderReader + RequestReader + DocumentReader + ?Sized,
{
    let (_, clients) = repo.list_clients(ClientListQuery::new(firm_id))?;
    let (_, providers) = repo.list_providers(ProviderListQuery::new(firm_id))?;
    let (_, requests) = repo.list_requests(RequestListQuery::new(firm_id))?;
    let (_, documents) = repo.list_documents(DocumentListQuery::new(firm_id))?;

    Ok(DashboardMetrics::compute(
        &clients, &providers, &requests, &documents, today,
    ))
}

/// Loads metrics and the most recent requests for the dashboard.
pub fn load_dashboard<R>(
    repo: &R,
    user: &AuthenticatedUser,
    today: NaiveDate,
) -> ServiceResult<DashboardPageData>
where
    R: ClientReader + ProviderReader + RequestReader + DocumentReader + ?Sized,
{
    authorize(user, Feature::Dashboard)?;

    let firm_id = FirmId::new(user.firm_id)?;
    let metrics = compute_metrics(repo, firm_id, today).map_err(|err| {
        log::error!("Failed to compute dashboard metrics: {err}");
        err
    })?;

    let (_, recent) = repo.list_requests(
        RequestListQuery::new(firm_id)
            .sort(RequestSort::Created, SortOrder::Desc)
            .paginate(1, RECENT_REQUESTS),
    )?;
    let recent_requests = request_rows(repo, firm_id, recent, today)?;

    Ok(DashboardPageData {
        metrics,
        recent_requests,
    })
}

/// JSON snapshot of the dashboard metrics for download.
pub fn export_metrics<R>(
    repo: &R,
    user: &AuthenticatedUser,
    now: NaiveDateTime,
) -> ServiceResult<ExportFile>
where
    R: ClientReader + ProviderReader + RequestReader + DocumentReader + ?Sized,
{
    authorize(user, Feature::ExportData)?;

    let firm_id = FirmId::new(user.firm_id)?;
    let metrics = compute_metrics(repo, firm_id, now.date())?;
    let body = metrics_to_json(&user.firm_name, &metrics, now)?;

    Ok(ExportFile {
        file_name: attachment_name("dashboard-metrics", now.date(), "json"),
        content_type: "application/json",
        body,
    })
}
