//! Read-only settings page: firm profile and the caller's permissions.

use crate::domain::auth::AuthenticatedUser;
use crate::domain::types::FirmId;
use crate::dto::settings::{FeatureAccess, SettingsPageData};
use crate::policy::{Feature, authorize, is_permitted};
use crate::repository::FirmReader;
use crate::services::{ServiceError, ServiceResult};

pub fn load_settings<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<SettingsPageData>
where
    R: FirmReader + ?Sized,
{
    authorize(user, Feature::ViewSettings)?;

    let firm_id = FirmId::new(user.firm_id)?;
    let firm = repo
        .get_firm_by_id(firm_id)
        .map_err(|err| {
            log::error!("Failed to load firm {firm_id}: {err}");
            err
        })?
        .ok_or(ServiceError::NotFound)?;

    let features = Feature::ALL
        .iter()
        .map(|&feature| FeatureAccess {
            feature,
            label: feature.label(),
            permitted: is_permitted(user.role, feature),
        })
        .collect();

    Ok(SettingsPageData {
        firm,
        role: user.role,
        features,
    })
}
