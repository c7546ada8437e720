//! Sign-in and password recovery pages. None of them require a session.

use actix_web::{HttpRequest, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use serde::Deserialize;
use tera::Tera;

use crate::auth::backend::AuthBackend;
use crate::auth::session::start_session;
use crate::forms::FieldErrors;
use crate::forms::auth::{ForgotPasswordForm, LoginForm, ResetPasswordForm};
use crate::models::config::ServerConfig;
use crate::routes::{
    HOME_PATH, handle_service_error, public_context, redirect, render_template,
    simulate_latency,
};
use crate::services::ServiceError;
use crate::services::auth as auth_service;

#[derive(Debug, Default, Deserialize)]
pub struct ResetQuery {
    pub token: Option<String>,
}

#[get("/login")]
pub async fn show_login(
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let mut context = public_context(&flash_messages, "login");
    context.insert("email", "");
    context.insert("errors", &FieldErrors::new());
    render_template(&tera, "login.html", &context)
}

#[post("/login")]
pub async fn login(
    req: HttpRequest,
    backend: web::Data<dyn AuthBackend>,
    server_config: web::Data<ServerConfig>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
    web::Form(form): web::Form<LoginForm>,
) -> impl Responder {
    let email = form.email.clone();
    simulate_latency(&server_config).await;

    match auth_service::sign_in(backend.get_ref(), form) {
        Ok(user) => match start_session(&req, &user, &server_config.secret) {
            Ok(_) => {
                FlashMessage::success(format!("Welcome back, {}.", user.name)).send();
                redirect(HOME_PATH)
            }
            Err(err) => {
                log::error!("Failed to start a session for {}: {err}", user.email);
                FlashMessage::error("Something went wrong. Please try again later.").send();
                redirect("/login")
            }
        },
        Err(ServiceError::Validation(err)) => {
            let mut context = public_context(&flash_messages, "login");
            context.insert("email", &email);
            context.insert("errors", &err.field_errors());
            render_template(&tera, "login.html", &context)
        }
        Err(err) => handle_service_error(err, "/login"),
    }
}

#[get("/forgot-password")]
pub async fn show_forgot_password(
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let mut context = public_context(&flash_messages, "forgot_password");
    context.insert("email", "");
    context.insert("errors", &FieldErrors::new());
    render_template(&tera, "forgot_password.html", &context)
}

#[post("/forgot-password")]
pub async fn forgot_password(
    backend: web::Data<dyn AuthBackend>,
    server_config: web::Data<ServerConfig>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
    web::Form(form): web::Form<ForgotPasswordForm>,
) -> impl Responder {
    let email = form.email.clone();
    simulate_latency(&server_config).await;

    let reset_url = server_config.reset_password_url();
    match auth_service::request_password_reset(backend.get_ref(), form, &reset_url) {
        Ok(()) => {
            FlashMessage::info("If an account exists for that address, a recovery link is on its way.")
                .send();
            redirect("/login")
        }
        Err(ServiceError::Validation(err)) => {
            let mut context = public_context(&flash_messages, "forgot_password");
            context.insert("email", &email);
            context.insert("errors", &err.field_errors());
            render_template(&tera, "forgot_password.html", &context)
        }
        Err(err) => handle_service_error(err, "/forgot-password"),
    }
}

#[get("/reset-password")]
pub async fn show_reset_password(
    query: web::Query<ResetQuery>,
    backend: web::Data<dyn AuthBackend>,
    server_config: web::Data<ServerConfig>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    simulate_latency(&server_config).await;

    let token = query.into_inner().token;
    match auth_service::verify_reset_token(backend.get_ref(), token.as_deref()) {
        Ok(email) => {
            let mut context = public_context(&flash_messages, "reset_password");
            context.insert("email", &email);
            context.insert("token", &token.unwrap_or_default());
            context.insert("errors", &FieldErrors::new());
            render_template(&tera, "reset_password.html", &context)
        }
        Err(err) => handle_service_error(err, "/forgot-password"),
    }
}

#[post("/reset-password")]
pub async fn reset_password(
    backend: web::Data<dyn AuthBackend>,
    server_config: web::Data<ServerConfig>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
    web::Form(form): web::Form<ResetPasswordForm>,
) -> impl Responder {
    let token = form.token.clone();
    simulate_latency(&server_config).await;

    match auth_service::reset_password(backend.get_ref(), form) {
        Ok(()) => {
            FlashMessage::success("Your password has been updated. Please sign in.").send();
            redirect("/login")
        }
        Err(ServiceError::Validation(err)) => {
            let mut context = public_context(&flash_messages, "reset_password");
            context.insert("token", &token);
            context.insert("errors", &err.field_errors());
            render_template(&tera, "reset_password.html", &context)
        }
        Err(err) => handle_service_error(err, "/forgot-password"),
    }
}
