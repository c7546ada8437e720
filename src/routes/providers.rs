use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use chrono::Utc;
use tera::{Context, Tera};

use crate::domain::auth::AuthenticatedUser;
use crate::domain::provider::{ProviderStatus, ProviderType};
use crate::dto::choices;
use crate::dto::providers::ProvidersQuery;
use crate::forms::FieldErrors;
use crate::forms::provider::AddProviderForm;
use crate::policy::{Feature, authorize};
use crate::repository::{InMemoryRepository, ProviderSort, SortOrder};
use crate::routes::{
    base_context, handle_service_error, insert_form_errors, page_base, redirect, render_template,
};
use crate::services::ServiceError;
use crate::services::providers as provider_service;

fn form_context(
    flash_messages: &IncomingFlashMessages,
    user: &AuthenticatedUser,
    form: &AddProviderForm,
    errors: &FieldErrors,
) -> Context {
    let mut context = base_context(flash_messages, user, "providers");
    context.insert("form", form);
    context.insert("errors", errors);
    context.insert("type_options", &choices(ProviderType::ALL, ProviderType::label));
    context
}

#[get("/providers")]
pub async fn show_providers(
    user: AuthenticatedUser,
    query: web::Query<ProvidersQuery>,
    repo: web::Data<InMemoryRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let query = query.into_inner();
    match provider_service::list_providers(repo.get_ref(), &user, &query) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "providers");
            context.insert("providers", &data.providers);
            context.insert("filters", &data.filters);
            context.insert("query", &query);
            context.insert(
                "page_base",
                &page_base("/providers", &ProvidersQuery { page: None, ..query.clone() }),
            );
            context.insert("type_options", &choices(ProviderType::ALL, ProviderType::label));
            context.insert(
                "status_options",
                &choices(ProviderStatus::ALL, ProviderStatus::label),
            );
            context.insert("sort_options", &choices(ProviderSort::ALL, ProviderSort::label));
            context.insert("order_options", &choices(SortOrder::ALL, SortOrder::label));
            render_template(&tera, "providers/index.html", &context)
        }
        Err(err) => handle_service_error(err, "/dashboard"),
    }
}

#[get("/providers/new")]
pub async fn new_provider(
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    if let Err(err) = authorize(&user, Feature::ManageProviders) {
        return handle_service_error(err.into(), "/providers");
    }
    let context = form_context(
        &flash_messages,
        &user,
        &AddProviderForm::default(),
        &FieldErrors::new(),
    );
    render_template(&tera, "providers/form.html", &context)
}

#[post("/providers")]
pub async fn add_provider(
    user: AuthenticatedUser,
    repo: web::Data<InMemoryRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
    web::Form(form): web::Form<AddProviderForm>,
) -> impl Responder {
    let echo = form.clone();
    match provider_service::add_provider(repo.get_ref(), &user, form) {
        Ok(provider) => {
            FlashMessage::success(format!("Provider {} added.", provider.name)).send();
            redirect(&format!("/providers/{}", provider.id))
        }
        Err(ServiceError::Validation(err)) => {
            let errors = err.field_errors();
            let mut context = form_context(&flash_messages, &user, &echo, &errors);
            insert_form_errors(&mut context, &echo, &errors);
            render_template(&tera, "providers/form.html", &context)
        }
        Err(err) => handle_service_error(err, "/providers"),
    }
}

#[get("/providers/{provider_id}")]
pub async fn show_provider(
    provider_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<InMemoryRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let today = Utc::now().date_naive();
    match provider_service::load_provider(repo.get_ref(), &user, provider_id.into_inner(), today) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "providers");
            context.insert("provider", &data.provider);
            context.insert("history", &data.history);
            render_template(&tera, "providers/show.html", &context)
        }
        Err(err) => handle_service_error(err, "/providers"),
    }
}
