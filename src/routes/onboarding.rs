use actix_web::{HttpRequest, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::auth::backend::AuthBackend;
use crate::auth::session::start_session;
use crate::forms::FieldErrors;
use crate::forms::onboarding::OnboardingForm;
use crate::models::config::ServerConfig;
use crate::repository::InMemoryRepository;
use crate::routes::{
    HOME_PATH, handle_service_error, insert_form_errors, public_context, redirect,
    render_template, simulate_latency,
};
use crate::services::ServiceError;
use crate::services::onboarding as onboarding_service;

#[get("/onboarding")]
pub async fn show_onboarding(
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let mut context = public_context(&flash_messages, "onboarding");
    context.insert("form", &OnboardingForm::default());
    context.insert("errors", &FieldErrors::new());
    render_template(&tera, "onboarding.html", &context)
}

/// Registers the firm and signs its administrator in.
#[post("/onboarding")]
pub async fn register_firm(
    req: HttpRequest,
    repo: web::Data<InMemoryRepository>,
    backend: web::Data<dyn AuthBackend>,
    server_config: web::Data<ServerConfig>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
    web::Form(form): web::Form<OnboardingForm>,
) -> impl Responder {
    let echo = form.clone();
    simulate_latency(&server_config).await;

    match onboarding_service::register_firm(repo.get_ref(), backend.get_ref(), form) {
        Ok(user) => {
            if let Err(err) = start_session(&req, &user, &server_config.secret) {
                log::error!("Failed to start a session for {}: {err}", user.email);
                FlashMessage::info("Your firm is ready. Please sign in.").send();
                return redirect("/login");
            }
            FlashMessage::success(format!("Welcome to RecordsDesk, {}.", user.firm_name)).send();
            redirect(HOME_PATH)
        }
        Err(ServiceError::Validation(err)) => {
            let mut context = public_context(&flash_messages, "onboarding");
            insert_form_errors(&mut context, &echo, &err.field_errors());
            render_template(&tera, "onboarding.html", &context)
        }
        Err(err) => handle_service_error(err, "/onboarding"),
    }
}
