//! HTTP handlers and the helpers they share.

use std::time::Duration;

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, http::header};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages, Level};
use serde::Serialize;
use tera::{Context, Tera};

use crate::domain::auth::AuthenticatedUser;
use crate::dto::ExportFile;
use crate::forms::FieldErrors;
use crate::models::config::ServerConfig;
use crate::policy::permitted_features;
use crate::services::ServiceError;
use crate::services::auth::user_message;

pub mod api;
pub mod auth;
pub mod clients;
pub mod documents;
pub mod main;
pub mod onboarding;
pub mod providers;
pub mod reports;
pub mod requests;
pub mod settings;
pub mod uploads;

/// Landing page after sign-in. Every role may open it.
pub const HOME_PATH: &str = "/dashboard";

/// Maps a flash message level to the Bootstrap alert class.
pub fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        Level::Info | Level::Debug => "info",
    }
}

fn alerts(flash_messages: &IncomingFlashMessages) -> Vec<(String, &'static str)> {
    flash_messages
        .iter()
        .map(|f| (f.content().to_string(), alert_level_to_str(&f.level())))
        .collect()
}

/// Context for pages reachable without a session.
pub fn public_context(flash_messages: &IncomingFlashMessages, current_page: &str) -> Context {
    let mut context = Context::new();
    context.insert("alerts", &alerts(flash_messages));
    context.insert("current_page", current_page);
    context
}

/// Context shared by every signed-in page: alerts, user and navigation.
pub fn base_context(
    flash_messages: &IncomingFlashMessages,
    user: &AuthenticatedUser,
    current_page: &str,
) -> Context {
    let mut context = public_context(flash_messages, current_page);
    context.insert("current_user", user);
    context.insert("permissions", permitted_features(user.role));
    context
}

/// Echoes a rejected form with its field messages and an inline alert.
pub fn insert_form_errors<T: Serialize>(context: &mut Context, form: &T, errors: &FieldErrors) {
    context.insert("form", form);
    context.insert("errors", errors);
    context.insert(
        "alerts",
        &[("Please correct the highlighted fields.", "danger")],
    );
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::Ok().content_type("text/html").body(body),
        Err(err) => {
            log::error!("Failed to render template '{template}': {err:?}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Same as [`render_template`] with a custom status, e.g. 404 or 422.
pub fn render_with_status(
    tera: &Tera,
    status: actix_web::http::StatusCode,
    template: &str,
    context: &Context,
) -> HttpResponse {
    let mut response = render_template(tera, template, context);
    if response.status().is_success() {
        *response.status_mut() = status;
    }
    response
}

/// Link prefix for the pages of a filtered list, e.g. `/clients?status=active&`.
pub fn page_base<Q: Serialize>(path: &str, query: &Q) -> String {
    match serde_html_form::to_string(query) {
        Ok(qs) if !qs.is_empty() => format!("{path}?{qs}&"),
        _ => format!("{path}?"),
    }
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Serves an export as an attachment.
pub fn download(file: ExportFile) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(file.content_type)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(file.file_name)],
        })
        .body(file.body)
}

/// Stands in for the network round trip to a real identity provider.
pub async fn simulate_latency(config: &ServerConfig) {
    if config.simulated_latency_ms > 0 {
        actix_web::rt::time::sleep(Duration::from_millis(config.simulated_latency_ms)).await;
    }
}

/// Flashes a message for a failed operation and redirects to `fallback`.
///
/// Unexpected failures are logged and answered with a 500.
pub fn handle_service_error(err: ServiceError, fallback: &str) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => {
            FlashMessage::error("You do not have access to that page.").send();
            redirect(HOME_PATH)
        }
        ServiceError::NotFound => {
            FlashMessage::error("The requested record was not found.").send();
            redirect(fallback)
        }
        ServiceError::Form(message) => {
            FlashMessage::error(message).send();
            redirect(fallback)
        }
        ServiceError::Validation(err) => {
            log::info!("Rejected form: {err}");
            FlashMessage::error("Please correct the highlighted fields.").send();
            redirect(fallback)
        }
        ServiceError::Auth(err) => {
            FlashMessage::error(user_message(&err)).send();
            redirect(fallback)
        }
        err => {
            log::error!("Request failed: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
