use std::sync::Arc;

use actix_identity::Identity;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use chrono::Utc;
use tera::Tera;

use crate::domain::auth::AuthenticatedUser;
use crate::repository::InMemoryRepository;
use crate::routes::{
    base_context, download, handle_service_error, public_context, redirect, render_template,
    render_with_status,
};
use crate::services::dashboard as dashboard_service;
use crate::upload_queue::UploadQueue;

#[get("/")]
pub async fn index() -> impl Responder {
    redirect("/dashboard")
}

#[get("/dashboard")]
pub async fn show_dashboard(
    user: AuthenticatedUser,
    repo: web::Data<InMemoryRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let today = Utc::now().date_naive();
    match dashboard_service::load_dashboard(repo.get_ref(), &user, today) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "dashboard");
            context.insert("metrics", &data.metrics);
            context.insert("recent_requests", &data.recent_requests);
            render_template(&tera, "dashboard.html", &context)
        }
        Err(err) => handle_service_error(err, "/login"),
    }
}

#[get("/dashboard/export")]
pub async fn export_dashboard(
    user: AuthenticatedUser,
    repo: web::Data<InMemoryRepository>,
) -> impl Responder {
    match dashboard_service::export_metrics(repo.get_ref(), &user, Utc::now().naive_utc()) {
        Ok(file) => download(file),
        Err(err) => handle_service_error(err, "/dashboard"),
    }
}

#[get("/documentation")]
pub async fn documentation(
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let context = base_context(&flash_messages, &user, "documentation");
    render_template(&tera, "documentation.html", &context)
}

/// Ends the session and drops the user's pending uploads.
#[post("/logout")]
pub async fn logout(
    identity: Identity,
    user: AuthenticatedUser,
    queue: web::Data<Arc<UploadQueue>>,
) -> impl Responder {
    queue.discard_owner(&user.sub);
    identity.logout();
    log::info!("{} signed out", user.email);
    FlashMessage::info("You have been signed out.").send();
    redirect("/login")
}

/// Fallback for every unknown path.
pub async fn not_found(flash_messages: IncomingFlashMessages, tera: web::Data<Tera>) -> HttpResponse {
    let context = public_context(&flash_messages, "not_found");
    render_with_status(&tera, StatusCode::NOT_FOUND, "not_found.html", &context)
}
