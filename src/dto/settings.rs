use serde::Serialize;

use crate::domain::auth::Role;
use crate::domain::firm::Firm;
use crate::policy::Feature;

#[derive(Debug, Serialize)]
pub struct FeatureAccess {
    pub feature: Feature,
    pub label: &'static str,
    pub permitted: bool,
}

/// Read-only firm profile and the caller's permissions.
#[derive(Debug, Serialize)]
pub struct SettingsPageData {
    pub firm: Firm,
    pub role: Role,
    pub features: Vec<FeatureAccess>,
}
