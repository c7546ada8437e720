//! Registration of a new firm tenant and its first administrator.

use crate::auth::backend::{AuthBackend, NewAccount};
use crate::domain::auth::AuthenticatedUser;
use crate::forms::onboarding::{OnboardingForm, OnboardingPayload};
use crate::repository::FirmWriter;
use crate::repository::errors::RepositoryError;
use crate::services::{ServiceError, ServiceResult};

/// Creates the firm, then registers its administrator with the auth backend.
///
/// The firm record stays in place when the backend refuses the account.
pub fn register_firm<R, B>(
    repo: &R,
    backend: &B,
    form: OnboardingForm,
) -> ServiceResult<AuthenticatedUser>
where
    R: FirmWriter + ?Sized,
    B: AuthBackend + ?Sized,
{
    let payload = OnboardingPayload::try_from(form)?;

    let firm = repo.create_firm(&payload.firm).map_err(|err| match err {
        RepositoryError::ConstraintViolation(_) => {
            ServiceError::Form(format!("The subdomain \"{}\" is already taken.", payload.firm.subdomain))
        }
        other => {
            log::error!("Failed to create firm: {other}");
            ServiceError::from(other)
        }
    })?;

    let admin = NewAccount {
        name: payload.admin_name,
        email: payload.admin_email,
        password: payload.password,
    };

    let user = backend.register_firm(&firm, &admin).map_err(|err| {
        log::error!("Auth backend failed to register firm {}: {err}", firm.id);
        ServiceError::Auth(err)
    })?;

    log::info!("Firm {} onboarded by {}", firm.subdomain, user.email);
    Ok(user)
}
