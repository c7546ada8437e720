//! Identity collaborator used by the sign-in, recovery and onboarding flows.
//!
//! No real identity provider exists; [`DemoAuthBackend`] keeps accounts in
//! memory and logs recovery links instead of mailing them.

use std::collections::HashMap;

use chrono::{NaiveDateTime, TimeDelta, Utc};
use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::auth::{AuthenticatedUser, Role};
use crate::domain::firm::Firm;
use crate::domain::types::{EmailAddress, FirmId, PersonName, is_strong_password};

/// Email that always behaves like a missing account.
pub const NOT_FOUND_SENTINEL: &str = "unknown@example.com";

/// Password of every seeded demo account.
pub const DEMO_PASSWORD: &str = "demo1234";

fn reset_token_ttl() -> TimeDelta {
    TimeDelta::hours(1)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("account not found")]
    NotFound,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("recovery link is invalid or has expired")]
    InvalidToken,

    #[error("an account with this email already exists")]
    EmailTaken,

    #[error("password does not meet the strength rules")]
    WeakPassword,

    #[error("auth backend unavailable: {0}")]
    Unavailable(String),
}

/// First administrator created during onboarding.
#[derive(Clone, Debug)]
pub struct NewAccount {
    pub name: PersonName,
    pub email: EmailAddress,
    pub password: String,
}

#[cfg_attr(feature = "test-mocks", mockall::automock)]
pub trait AuthBackend: Send + Sync {
    fn sign_in(&self, email: &EmailAddress, password: &str)
    -> Result<AuthenticatedUser, AuthError>;
    /// Issues a recovery token and delivers `{reset_url}?token=...`.
    fn send_reset_email(&self, email: &EmailAddress, reset_url: &str) -> Result<(), AuthError>;
    /// Resolves a recovery token to the account it was issued for.
    fn session_from_access_token(&self, token: &str) -> Result<EmailAddress, AuthError>;
    fn update_password(&self, token: &str, password: &str) -> Result<(), AuthError>;
    fn register_firm(
        &self,
        firm: &Firm,
        admin: &NewAccount,
    ) -> Result<AuthenticatedUser, AuthError>;
}

#[derive(Clone, Debug)]
struct Account {
    sub: String,
    email: EmailAddress,
    name: String,
    password: String,
    firm_id: FirmId,
    firm_name: String,
    role: Role,
}

impl Account {
    fn to_user(&self) -> AuthenticatedUser {
        AuthenticatedUser {
            sub: self.sub.clone(),
            email: self.email.to_string(),
            name: self.name.clone(),
            firm_id: self.firm_id.get(),
            firm_name: self.firm_name.clone(),
            role: self.role,
            exp: 0,
        }
    }
}

#[derive(Debug)]
struct ResetToken {
    email: EmailAddress,
    expires_at: NaiveDateTime,
}

#[derive(Debug, Default)]
pub struct DemoAuthBackend {
    accounts: RwLock<Vec<Account>>,
    reset_tokens: Mutex<HashMap<String, ResetToken>>,
}

fn is_sentinel(email: &EmailAddress) -> bool {
    email.as_str() == NOT_FOUND_SENTINEL
}

impl DemoAuthBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// One account per role for the demo firm, e.g. `admin@smithlaw.example.com`.
    pub fn seeded(firm_id: FirmId, firm_name: &str) -> Result<Self, AuthError> {
        let backend = Self::new();
        {
            let mut accounts = backend.accounts.write();
            for role in Role::ALL {
                let email = EmailAddress::new(format!("{role}@smithlaw.example.com"))
                    .map_err(|err| AuthError::Unavailable(err.to_string()))?;
                accounts.push(Account {
                    sub: Uuid::new_v4().to_string(),
                    email,
                    name: format!("Demo {}", role.label()),
                    password: DEMO_PASSWORD.to_string(),
                    firm_id,
                    firm_name: firm_name.to_string(),
                    role: *role,
                });
            }
        }
        Ok(backend)
    }

    fn find(&self, email: &EmailAddress) -> Option<Account> {
        self.accounts
            .read()
            .iter()
            .find(|account| &account.email == email)
            .cloned()
    }

    fn resolve_token(&self, token: &str) -> Result<EmailAddress, AuthError> {
        let now = Utc::now().naive_utc();
        let mut tokens = self.reset_tokens.lock();
        tokens.retain(|_, issued| issued.expires_at > now);
        tokens
            .get(token)
            .map(|issued| issued.email.clone())
            .ok_or(AuthError::InvalidToken)
    }
}

impl AuthBackend for DemoAuthBackend {
    fn sign_in(
        &self,
        email: &EmailAddress,
        password: &str,
    ) -> Result<AuthenticatedUser, AuthError> {
        if is_sentinel(email) {
            return Err(AuthError::NotFound);
        }
        match self.find(email) {
            Some(account) if account.password == password => Ok(account.to_user()),
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    fn send_reset_email(&self, email: &EmailAddress, reset_url: &str) -> Result<(), AuthError> {
        if is_sentinel(email) {
            return Err(AuthError::NotFound);
        }
        // Unknown addresses succeed silently.
        if self.find(email).is_none() {
            log::info!("Password reset requested for unknown address {email}");
            return Ok(());
        }

        let token = Uuid::new_v4().simple().to_string();
        self.reset_tokens.lock().insert(
            token.clone(),
            ResetToken {
                email: email.clone(),
                expires_at: Utc::now().naive_utc() + reset_token_ttl(),
            },
        );
        log::info!("Password reset link for {email}: {reset_url}?token={token}");
        Ok(())
    }

    fn session_from_access_token(&self, token: &str) -> Result<EmailAddress, AuthError> {
        self.resolve_token(token)
    }

    fn update_password(&self, token: &str, password: &str) -> Result<(), AuthError> {
        if !is_strong_password(password) {
            return Err(AuthError::WeakPassword);
        }
        let email = self.resolve_token(token)?;

        let mut accounts = self.accounts.write();
        let account = accounts
            .iter_mut()
            .find(|account| account.email == email)
            .ok_or(AuthError::NotFound)?;
        account.password = password.to_string();
        drop(accounts);

        self.reset_tokens.lock().remove(token);
        log::info!("Password updated for {email}");
        Ok(())
    }

    fn register_firm(
        &self,
        firm: &Firm,
        admin: &NewAccount,
    ) -> Result<AuthenticatedUser, AuthError> {
        if !is_strong_password(&admin.password) {
            return Err(AuthError::WeakPassword);
        }

        let mut accounts = self.accounts.write();
        if accounts.iter().any(|account| account.email == admin.email) {
            return Err(AuthError::EmailTaken);
        }

        let account = Account {
            sub: Uuid::new_v4().to_string(),
            email: admin.email.clone(),
            name: admin.name.to_string(),
            password: admin.password.clone(),
            firm_id: firm.id,
            firm_name: firm.name.to_string(),
            role: Role::Admin,
        };
        let user = account.to_user();
        accounts.push(account);

        log::info!("Registered firm {} with admin {}", firm.subdomain, admin.email);
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{FirmName, Subdomain};

    fn backend() -> DemoAuthBackend {
        DemoAuthBackend::seeded(FirmId::new(1).unwrap(), "Smith & Associates Law").unwrap()
    }

    fn email(raw: &str) -> EmailAddress {
        EmailAddress::new(raw).unwrap()
    }

    #[test]
    fn seeded_accounts_sign_in_with_their_role() {
        let backend = backend();
        let user = backend
            .sign_in(&email("paralegal@smithlaw.example.com"), DEMO_PASSWORD)
            .unwrap();
        assert_eq!(user.role, Role::Paralegal);
        assert_eq!(user.firm_id, 1);

        assert_eq!(
            backend.sign_in(&email("paralegal@smithlaw.example.com"), "wrong"),
            Err(AuthError::InvalidCredentials)
        );
    }

    #[test]
    fn sentinel_email_is_not_found() {
        let backend = backend();
        assert_eq!(
            backend.send_reset_email(&email(NOT_FOUND_SENTINEL), "http://x/reset-password"),
            Err(AuthError::NotFound)
        );
        assert_eq!(
            backend.sign_in(&email(NOT_FOUND_SENTINEL), DEMO_PASSWORD),
            Err(AuthError::NotFound)
        );
    }

    #[test]
    fn reset_flow_replaces_the_password_once() {
        let backend = backend();
        let admin = email("admin@smithlaw.example.com");
        backend.send_reset_email(&admin, "http://x/reset-password").unwrap();

        let token = backend
            .reset_tokens
            .lock()
            .keys()
            .next()
            .cloned()
            .unwrap();
        assert_eq!(backend.session_from_access_token(&token), Ok(admin.clone()));

        assert_eq!(
            backend.update_password(&token, "short"),
            Err(AuthError::WeakPassword)
        );
        backend.update_password(&token, "newpass99").unwrap();
        assert!(backend.sign_in(&admin, "newpass99").is_ok());
        assert_eq!(
            backend.session_from_access_token(&token),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn register_firm_creates_an_admin_once() {
        let backend = DemoAuthBackend::new();
        let firm = Firm {
            id: FirmId::new(2).unwrap(),
            name: FirmName::new("Acme Law").unwrap(),
            subdomain: Subdomain::new("acmelaw").unwrap(),
            contact_email: email("ada@acme.example.com"),
            phone: None,
            created_at: Utc::now().naive_utc(),
        };
        let admin = NewAccount {
            name: PersonName::new("Ada").unwrap(),
            email: email("ada@acme.example.com"),
            password: "secret123".into(),
        };

        let user = backend.register_firm(&firm, &admin).unwrap();
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.firm_id, 2);
        assert_eq!(
            backend.register_firm(&firm, &admin),
            Err(AuthError::EmailTaken)
        );
    }
}
