use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::document::{DocumentCategory, DocumentStatus};
use crate::dto::choices;
use crate::dto::documents::DocumentsQuery;
use crate::repository::InMemoryRepository;
use crate::routes::{
    base_context, handle_service_error, page_base, redirect, render_template,
};
use crate::services::documents as document_service;

#[get("/documents")]
pub async fn show_documents(
    user: AuthenticatedUser,
    query: web::Query<DocumentsQuery>,
    repo: web::Data<InMemoryRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let query = query.into_inner();
    match document_service::list_documents(repo.get_ref(), &user, &query) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "documents");
            context.insert("documents", &data.documents);
            context.insert("filters", &data.filters);
            context.insert("query", &query);
            context.insert(
                "page_base",
                &page_base("/documents", &DocumentsQuery { page: None, ..query.clone() }),
            );
            context.insert(
                "category_options",
                &choices(DocumentCategory::ALL, DocumentCategory::label),
            );
            context.insert(
                "status_options",
                &choices(DocumentStatus::ALL, DocumentStatus::label),
            );
            render_template(&tera, "documents/index.html", &context)
        }
        Err(err) => handle_service_error(err, "/dashboard"),
    }
}

#[get("/documents/{document_id}")]
pub async fn show_document(
    document_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<InMemoryRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match document_service::load_preview(repo.get_ref(), &user, document_id.into_inner()) {
        Ok(preview) => {
            let mut context = base_context(&flash_messages, &user, "documents");
            context.insert("preview", &preview);
            render_template(&tera, "documents/show.html", &context)
        }
        Err(err) => handle_service_error(err, "/documents"),
    }
}

#[post("/documents/{document_id}/delete")]
pub async fn delete_document(
    document_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<InMemoryRepository>,
) -> impl Responder {
    match document_service::delete_document(repo.get_ref(), &user, document_id.into_inner()) {
        Ok(()) => {
            FlashMessage::success("Document deleted.").send();
            redirect("/documents")
        }
        Err(err) => handle_service_error(err, "/documents"),
    }
}
