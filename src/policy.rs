//! Role based access to dashboard features.
//!
//! [`POLICY`] is the single source of truth; every handler and service asks
//! [`authorize`] instead of comparing role strings.

use serde::Serialize;
use thiserror::Error;

use crate::domain::auth::{AuthenticatedUser, Role};
use crate::domain::types::closed_enum;

closed_enum!(
    /// Feature keys guarded by the policy table.
    Feature {
        Dashboard => ("dashboard", "View dashboard"),
        ViewClients => ("view_clients", "View clients"),
        ManageClients => ("manage_clients", "Add, edit and delete clients"),
        ExportData => ("export_data", "Export CSV and JSON"),
        ViewProviders => ("view_providers", "View providers"),
        ManageProviders => ("manage_providers", "Add providers"),
        ViewRequests => ("view_requests", "View records requests"),
        ManageRequests => ("manage_requests", "Create and update records requests"),
        ViewDocuments => ("view_documents", "View documents"),
        UploadDocuments => ("upload_documents", "Upload and delete documents"),
        ViewReports => ("view_reports", "View reports"),
        ViewSettings => ("view_settings", "View firm settings"),
    }
);

use Feature::*;

/// Role → permitted features.
pub const POLICY: &[(Role, &[Feature])] = &[
    (
        Role::Admin,
        &[
            Dashboard,
            ViewClients,
            ManageClients,
            ExportData,
            ViewProviders,
            ManageProviders,
            ViewRequests,
            ManageRequests,
            ViewDocuments,
            UploadDocuments,
            ViewReports,
            ViewSettings,
        ],
    ),
    (
        Role::Attorney,
        &[
            Dashboard,
            ViewClients,
            ManageClients,
            ExportData,
            ViewProviders,
            ManageProviders,
            ViewRequests,
            ManageRequests,
            ViewDocuments,
            UploadDocuments,
            ViewReports,
        ],
    ),
    (
        Role::Paralegal,
        &[
            Dashboard,
            ViewClients,
            ManageClients,
            ViewProviders,
            ViewRequests,
            ManageRequests,
            ViewDocuments,
            UploadDocuments,
        ],
    ),
    (
        Role::Viewer,
        &[
            Dashboard,
            ViewClients,
            ViewProviders,
            ViewRequests,
            ViewDocuments,
            ViewReports,
        ],
    ),
];

/// Raised when a role lacks a feature.
#[derive(Debug, Error, PartialEq, Eq, Serialize)]
#[error("role {role} may not use {feature}")]
pub struct Forbidden {
    pub role: Role,
    pub feature: Feature,
}

/// Features granted to `role`.
pub fn permitted_features(role: Role) -> &'static [Feature] {
    POLICY
        .iter()
        .find(|(entry, _)| *entry == role)
        .map(|(_, features)| *features)
        .unwrap_or(&[])
}

pub fn is_permitted(role: Role, feature: Feature) -> bool {
    permitted_features(role).contains(&feature)
}

/// The one authorization check used across the application.
pub fn authorize(user: &AuthenticatedUser, feature: Feature) -> Result<(), Forbidden> {
    if is_permitted(user.role, feature) {
        Ok(())
    } else {
        log::warn!("{} ({}) denied {feature}", user.email, user.role);
        Err(Forbidden {
            role: user.role,
            feature,
        })
    }
}
