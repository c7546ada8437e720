//! Upload page. The live queue is polled through `/api/v1/uploads`.

use std::sync::Arc;
use std::time::Instant;

use actix_multipart::MultipartError;
use actix_multipart::form::MultipartForm;
use actix_web::error::InternalError;
use actix_web::{HttpRequest, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::document::human_size;
use crate::domain::upload::{ACCEPTED_EXTENSIONS, MAX_BATCH_FILES, MAX_FILE_SIZE};
use crate::forms::upload::UploadDocumentsForm;
use crate::routes::{base_context, handle_service_error, redirect, render_template};
use crate::services::uploads as upload_service;
use crate::upload_queue::UploadQueue;

const UPLOAD_PATH: &str = "/documents/upload";

/// Answers an unreadable or oversized multipart body with a flash message on
/// the upload page instead of a bare error status.
pub fn multipart_error(err: MultipartError, _req: &HttpRequest) -> actix_web::Error {
    log::warn!("Rejected multipart upload: {err}");
    FlashMessage::error(format!(
        "The selected files could not be uploaded. Choose at most {MAX_BATCH_FILES} files of up to {} each.",
        human_size(MAX_FILE_SIZE)
    ))
    .send();
    InternalError::from_response(err, redirect(UPLOAD_PATH)).into()
}

#[get("/documents/upload")]
pub async fn show_upload(
    user: AuthenticatedUser,
    queue: web::Data<Arc<UploadQueue>>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match upload_service::list_uploads(queue.get_ref(), &user) {
        Ok(view) => {
            let mut context = base_context(&flash_messages, &user, "documents");
            context.insert("uploads", &view);
            context.insert("max_files", &MAX_BATCH_FILES);
            context.insert("accept", &ACCEPTED_EXTENSIONS.join(","));
            render_template(&tera, "documents/upload.html", &context)
        }
        Err(err) => handle_service_error(err, "/documents"),
    }
}

#[post("/documents/upload")]
pub async fn upload_documents(
    user: AuthenticatedUser,
    queue: web::Data<Arc<UploadQueue>>,
    MultipartForm(form): MultipartForm<UploadDocumentsForm>,
) -> impl Responder {
    let files = form.descriptors();
    match upload_service::intake(
        queue.get_ref(),
        &user,
        files,
        Instant::now(),
        &mut rand::rng(),
    ) {
        Ok(outcome) => {
            for message in outcome.rejected {
                FlashMessage::error(message).send();
            }
            if !outcome.accepted.is_empty() {
                FlashMessage::info(format!("{} file(s) queued for upload.", outcome.accepted.len()))
                    .send();
            }
            redirect(UPLOAD_PATH)
        }
        Err(err) => handle_service_error(err, UPLOAD_PATH),
    }
}
