use serde::Serialize;

use crate::domain::dashboard::DashboardMetrics;
use crate::dto::requests::RequestRow;

/// Number of requests listed under "Recent requests".
pub const RECENT_REQUESTS: usize = 5;

/// Data required to render the dashboard template.
#[derive(Debug, Serialize)]
pub struct DashboardPageData {
    pub metrics: DashboardMetrics,
    pub recent_requests: Vec<RequestRow>,
}
