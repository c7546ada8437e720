//! Session claims carried by every authenticated request.

use serde::{Deserialize, Serialize};

use crate::domain::types::closed_enum;

closed_enum!(
    /// Firm staff role; permissions are resolved through [`crate::policy`].
    Role {
        Admin => ("admin", "Administrator"),
        Attorney => ("attorney", "Attorney"),
        Paralegal => ("paralegal", "Paralegal"),
        Viewer => ("viewer", "Viewer"),
    }
);

/// The signed-in staff member. Serialized as JWT claims inside the identity
/// cookie and handed to every service call explicitly.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Stable account identifier.
    pub sub: String,
    pub email: String,
    pub name: String,
    pub firm_id: i32,
    pub firm_name: String,
    pub role: Role,
    /// Expiry as a unix timestamp.
    pub exp: usize,
}
