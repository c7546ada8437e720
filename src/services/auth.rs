//! Sign-in and password recovery against the [`AuthBackend`] collaborator.

use crate::auth::backend::{AuthBackend, AuthError};
use crate::domain::auth::AuthenticatedUser;
use crate::domain::types::EmailAddress;
use crate::forms::auth::{
    ForgotPasswordForm, LoginForm, LoginPayload, ResetPasswordForm, ResetPasswordPayload,
};
use crate::services::{ServiceError, ServiceResult};

/// Message shown to the user for a backend failure. Details only go to the log.
pub fn user_message(err: &AuthError) -> &'static str {
    match err {
        AuthError::InvalidCredentials => "Invalid email or password.",
        AuthError::InvalidToken => "This recovery link is invalid or has expired.",
        AuthError::EmailTaken => "An account with this email already exists.",
        AuthError::WeakPassword => "Password must be at least 8 characters and contain a number.",
        AuthError::NotFound | AuthError::Unavailable(_) => {
            "Something went wrong. Please try again later."
        }
    }
}

fn logged(action: &str) -> impl Fn(AuthError) -> ServiceError + '_ {
    move |err| {
        log::error!("Auth backend failed to {action}: {err}");
        ServiceError::Auth(err)
    }
}

pub fn sign_in<B>(backend: &B, form: LoginForm) -> ServiceResult<AuthenticatedUser>
where
    B: AuthBackend + ?Sized,
{
    let payload = LoginPayload::try_from(form)?;

    let user = backend
        .sign_in(&payload.email, &payload.password)
        .map_err(|err| match err {
            AuthError::InvalidCredentials => {
                log::info!("Failed sign-in for {}", payload.email);
                ServiceError::Auth(err)
            }
            AuthError::NotFound => {
                log::warn!("Sign-in for unknown account {}", payload.email);
                ServiceError::Auth(AuthError::InvalidCredentials)
            }
            other => logged("sign in")(other),
        })?;

    log::info!("{} signed in as {}", user.email, user.role);
    Ok(user)
}

/// Asks the backend to mail a recovery link pointing at `reset_url`.
///
/// A missing account is only logged; the caller answers exactly as it does
/// for a known address.
pub fn request_password_reset<B>(
    backend: &B,
    form: ForgotPasswordForm,
    reset_url: &str,
) -> ServiceResult<()>
where
    B: AuthBackend + ?Sized,
{
    let email = EmailAddress::try_from(form)?;
    match backend.send_reset_email(&email, reset_url) {
        Err(AuthError::NotFound) => {
            log::warn!("Password reset requested for unknown account {email}");
            Ok(())
        }
        other => other.map_err(logged("send a reset email")),
    }
}

/// Resolves the token of a recovery link before showing the reset form.
pub fn verify_reset_token<B>(backend: &B, token: Option<&str>) -> ServiceResult<EmailAddress>
where
    B: AuthBackend + ?Sized,
{
    let token = token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ServiceError::Auth(AuthError::InvalidToken))?;

    backend.session_from_access_token(token).map_err(|err| {
        log::warn!("Rejected recovery token: {err}");
        ServiceError::Auth(err)
    })
}

pub fn reset_password<B>(backend: &B, form: ResetPasswordForm) -> ServiceResult<()>
where
    B: AuthBackend + ?Sized,
{
    let payload = ResetPasswordPayload::try_from(form)?;
    backend
        .update_password(&payload.token, &payload.password)
        .map_err(logged("update a password"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::backend::{DEMO_PASSWORD, DemoAuthBackend, NOT_FOUND_SENTINEL};
    use crate::domain::auth::Role;
    use crate::domain::types::FirmId;

    fn backend() -> DemoAuthBackend {
        DemoAuthBackend::seeded(FirmId::new(1).unwrap(), "Smith & Associates Law").unwrap()
    }

    fn login(email: &str, password: &str) -> LoginForm {
        LoginForm {
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn demo_accounts_sign_in() {
        let user = sign_in(&backend(), login("attorney@smithlaw.example.com", DEMO_PASSWORD))
            .unwrap();
        assert_eq!(user.role, Role::Attorney);
    }

    #[test]
    fn bad_password_is_an_auth_error() {
        let err = sign_in(&backend(), login("attorney@smithlaw.example.com", "nope"))
            .unwrap_err();
        let ServiceError::Auth(err) = err else {
            panic!("expected auth error");
        };
        assert_eq!(user_message(&err), "Invalid email or password.");
    }

    #[test]
    fn malformed_email_is_a_validation_error() {
        let err = sign_in(&backend(), login("attorney", DEMO_PASSWORD)).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn missing_account_reset_looks_like_any_other() {
        let form = |email: &str| ForgotPasswordForm {
            email: email.into(),
        };
        let url = "http://localhost/reset-password";

        assert!(request_password_reset(&backend(), form(NOT_FOUND_SENTINEL), url).is_ok());
        assert!(request_password_reset(&backend(), form("nobody@example.org"), url).is_ok());
        assert!(request_password_reset(&backend(), form("admin@smithlaw.example.com"), url).is_ok());
    }

    #[test]
    fn missing_account_sign_in_reads_as_bad_credentials() {
        let err = sign_in(&backend(), login(NOT_FOUND_SENTINEL, DEMO_PASSWORD)).unwrap_err();
        let ServiceError::Auth(err) = err else {
            panic!("expected auth error");
        };
        assert_eq!(user_message(&err), "Invalid email or password.");
    }

    #[test]
    fn missing_token_is_invalid() {
        assert!(matches!(
            verify_reset_token(&backend(), None),
            Err(ServiceError::Auth(AuthError::InvalidToken))
        ));
        assert!(matches!(
            verify_reset_token(&backend(), Some("not-a-token")),
            Err(ServiceError::Auth(AuthError::InvalidToken))
        ));
    }

    #[test]
    fn mismatched_confirmation_never_reaches_backend() {
        let form = ResetPasswordForm {
            token: "abc".into(),
            password: "abcd1234".into(),
            confirm_password: "abcd12345".into(),
        };
        let err = reset_password(&backend(), form).unwrap_err();
        let ServiceError::Validation(err) = err else {
            panic!("expected validation error");
        };
        assert!(err.field_errors().contains_key("confirm_password"));
    }
}

#[cfg(all(test, feature = "test-mocks"))]
mod mock_tests {
    use super::*;
    use crate::auth::backend::MockAuthBackend;

    #[test]
    fn reset_request_passes_url_to_backend() {
        let mut backend = MockAuthBackend::new();
        backend
            .expect_send_reset_email()
            .withf(|email, url| {
                email.as_str() == "admin@smithlaw.example.com"
                    && url == "http://localhost:8080/reset-password"
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let form = ForgotPasswordForm {
            email: "Admin@SmithLaw.example.com".into(),
        };
        request_password_reset(&backend, form, "http://localhost:8080/reset-password").unwrap();
    }

    #[test]
    fn backend_outage_surfaces_as_auth_error() {
        let mut backend = MockAuthBackend::new();
        backend
            .expect_update_password()
            .returning(|_, _| Err(AuthError::Unavailable("timeout".into())));

        let form = ResetPasswordForm {
            token: "abc".into(),
            password: "abcd1234".into(),
            confirm_password: "abcd1234".into(),
        };
        let err = reset_password(&backend, form).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Auth(AuthError::Unavailable(_))
        ));
    }
}
