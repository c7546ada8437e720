//! Page-level use cases shared by the HTML routes and the JSON API.
//!
//! Every service takes the signed-in user explicitly and checks
//! [`crate::policy::authorize`] before touching a repository.

use thiserror::Error;

use crate::auth::backend::AuthError;
use crate::export::ExportError;
use crate::forms::FormError;
use crate::repository::errors::RepositoryError;

pub mod api;
pub mod auth;
pub mod clients;
pub mod dashboard;
pub mod documents;
pub mod onboarding;
pub mod providers;
pub mod reports;
pub mod requests;
pub mod settings;
pub mod uploads;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    /// Request-level problem with a message safe to show the user.
    #[error("{0}")]
    Form(String),

    /// Field-level validation failure; the form should be re-rendered.
    #[error("validation failed: {0}")]
    Validation(#[from] FormError),

    #[error("type constraint violated: {0}")]
    TypeConstraint(String),

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("export failed: {0}")]
    Export(#[from] ExportError),

    #[error("auth backend error: {0}")]
    Auth(#[from] AuthError),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Shared fixtures for service tests.
#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;

    use crate::domain::auth::{AuthenticatedUser, Role};
    use crate::repository::InMemoryRepository;
    use crate::repository::seed::demo_store_for;

    pub fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    pub fn user(role: Role) -> AuthenticatedUser {
        AuthenticatedUser {
            sub: format!("{role}-1"),
            email: format!("{role}@smithlaw.example.com"),
            name: "Test User".to_string(),
            firm_id: 1,
            firm_name: "Smith & Associates Law".to_string(),
            role,
            exp: 0,
        }
    }

    pub fn repo() -> InMemoryRepository {
        InMemoryRepository::from_store(demo_store_for(today()).unwrap())
    }
}
