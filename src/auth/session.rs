//! Session context for HTTP handlers.
//!
//! The identity cookie stores a JWT with [`AuthenticatedUser`] claims signed
//! with the server secret. Handlers receive the user through the
//! `FromRequest` extractor below; there is no ambient global session.

use std::future::{Ready, ready};

use actix_identity::{Identity, IdentityExt};
use actix_web::dev::Payload;
use actix_web::error::{ErrorInternalServerError, ErrorUnauthorized};
use actix_web::{FromRequest, HttpMessage, HttpRequest, web};
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::domain::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;

fn session_ttl() -> TimeDelta {
    TimeDelta::hours(12)
}

/// Signs the user's claims, stamping a fresh expiry.
pub fn encode_session(
    user: &AuthenticatedUser,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let mut claims = user.clone();
    claims.exp = (Utc::now() + session_ttl()).timestamp().max(0) as usize;
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn decode_session(
    token: &str,
    secret: &str,
) -> Result<AuthenticatedUser, jsonwebtoken::errors::Error> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    decode::<AuthenticatedUser>(token, &key, &Validation::default()).map(|data| data.claims)
}

/// Attaches a signed session to the response cookie.
pub fn start_session(
    req: &HttpRequest,
    user: &AuthenticatedUser,
    secret: &str,
) -> Result<Identity, String> {
    let token = encode_session(user, secret).map_err(|err| err.to_string())?;
    Identity::login(&req.extensions(), token).map_err(|err| err.to_string())
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, actix_web::Error> {
    let identity = req
        .get_identity()
        .map_err(|_| ErrorUnauthorized("no session"))?;
    let token = identity.id().map_err(|_| ErrorUnauthorized("no session"))?;

    let config = req
        .app_data::<web::Data<ServerConfig>>()
        .ok_or_else(|| ErrorInternalServerError("server config missing"))?;

    decode_session(&token, &config.secret).map_err(|err| {
        log::warn!("Rejected session token: {err}");
        ErrorUnauthorized("invalid session")
    })
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::Role;

    fn user() -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "abc".into(),
            email: "admin@smithlaw.example.com".into(),
            name: "Admin".into(),
            firm_id: 1,
            firm_name: "Smith".into(),
            role: Role::Admin,
            exp: 0,
        }
    }

    #[test]
    fn session_round_trips_with_expiry() {
        let token = encode_session(&user(), "secret").unwrap();
        let decoded = decode_session(&token, "secret").unwrap();
        assert_eq!(decoded.email, "admin@smithlaw.example.com");
        assert_eq!(decoded.role, Role::Admin);
        assert!(decoded.exp > Utc::now().timestamp() as usize);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = encode_session(&user(), "secret").unwrap();
        assert!(decode_session(&token, "other").is_err());
    }
}
