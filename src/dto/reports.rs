use serde::Serialize;

use crate::domain::provider::Provider;

/// One bar of a count breakdown.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CountRow {
    pub key: &'static str,
    pub label: &'static str,
    pub count: usize,
    /// Share of the total, in percent.
    pub share: f32,
}

#[derive(Debug, Serialize)]
pub struct ReportsPageData {
    pub total_requests: usize,
    pub by_status: Vec<CountRow>,
    pub by_type: Vec<CountRow>,
    pub by_priority: Vec<CountRow>,
    /// Sorted by success rate, best first.
    pub provider_performance: Vec<Provider>,
}
