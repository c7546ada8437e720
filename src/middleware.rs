//! Turns `401 Unauthorized` responses into a redirect to the sign-in page.

use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::{StatusCode, header};
use actix_web::middleware::Next;
use actix_web::{Error, HttpResponse};

pub const SIGN_IN_PATH: &str = "/login";

/// Use with `actix_web::middleware::from_fn`.
pub async fn redirect_unauthorized(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let res = next.call(req).await?;

    if res.status() != StatusCode::UNAUTHORIZED {
        return Ok(res.map_into_boxed_body());
    }

    let (req, _) = res.into_parts();
    let redirect = HttpResponse::SeeOther()
        .insert_header((header::LOCATION, SIGN_IN_PATH))
        .finish();
    Ok(ServiceResponse::new(req, redirect))
}
