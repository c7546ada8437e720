//! JSON endpoints mounted under `/api`. Failures are answered with
//! [`ApiError`] bodies instead of redirects.

use std::sync::Arc;
use std::time::Instant;

use actix_web::{HttpResponse, Responder, delete, get, post, web};

use crate::domain::auth::AuthenticatedUser;
use crate::dto::api::{ApiError, ClientsQuery};
use crate::dto::uploads::UploadBatchRequest;
use crate::repository::InMemoryRepository;
use crate::services::ServiceError;
use crate::services::{api as api_service, uploads as upload_service};
use crate::upload_queue::UploadQueue;

fn error_response(err: ServiceError) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => HttpResponse::Forbidden().json(ApiError::new("forbidden")),
        ServiceError::NotFound => HttpResponse::NotFound().json(ApiError::new("not found")),
        ServiceError::Form(message) => HttpResponse::UnprocessableEntity().json(ApiError::new(message)),
        ServiceError::Validation(err) => {
            HttpResponse::UnprocessableEntity().json(ApiError::new(err.to_string()))
        }
        err => {
            log::error!("API request failed: {err}");
            HttpResponse::InternalServerError().json(ApiError::new("internal error"))
        }
    }
}

#[get("/v1/clients")]
pub async fn api_v1_clients(
    params: web::Query<ClientsQuery>,
    user: AuthenticatedUser,
    repo: web::Data<InMemoryRepository>,
) -> impl Responder {
    match api_service::list_clients(repo.get_ref(), &user, params.into_inner()) {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(err) => error_response(err),
    }
}

#[get("/v1/uploads")]
pub async fn api_v1_uploads(
    user: AuthenticatedUser,
    queue: web::Data<Arc<UploadQueue>>,
) -> impl Responder {
    match upload_service::list_uploads(queue.get_ref(), &user) {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(err) => error_response(err),
    }
}

#[post("/v1/uploads")]
pub async fn api_v1_create_uploads(
    user: AuthenticatedUser,
    queue: web::Data<Arc<UploadQueue>>,
    web::Json(batch): web::Json<UploadBatchRequest>,
) -> impl Responder {
    match upload_service::intake(
        queue.get_ref(),
        &user,
        batch.files,
        Instant::now(),
        &mut rand::rng(),
    ) {
        Ok(outcome) => HttpResponse::Accepted().json(outcome),
        Err(err) => error_response(err),
    }
}

#[delete("/v1/uploads/{upload_id}")]
pub async fn api_v1_delete_upload(
    upload_id: web::Path<String>,
    user: AuthenticatedUser,
    queue: web::Data<Arc<UploadQueue>>,
) -> impl Responder {
    match upload_service::remove_upload(queue.get_ref(), &user, upload_id.into_inner()) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(err),
    }
}
