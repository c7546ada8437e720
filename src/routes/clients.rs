use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use chrono::Utc;
use tera::{Context, Tera};

use crate::domain::auth::AuthenticatedUser;
use crate::domain::client::ClientStatus;
use crate::dto::clients::ClientsQuery;
use crate::dto::choices;
use crate::forms::FieldErrors;
use crate::forms::client::ClientForm;
use crate::policy::{Feature, authorize};
use crate::repository::{ClientSort, InMemoryRepository, SortOrder};
use crate::routes::{
    base_context, download, handle_service_error, insert_form_errors, page_base, redirect, render_template,
};
use crate::services::ServiceError;
use crate::services::clients as client_service;

fn form_context(
    flash_messages: &IncomingFlashMessages,
    user: &AuthenticatedUser,
    form: &ClientForm,
    errors: &FieldErrors,
) -> Context {
    let mut context = base_context(flash_messages, user, "clients");
    context.insert("form", form);
    context.insert("errors", errors);
    context.insert("status_options", &choices(ClientStatus::ALL, ClientStatus::label));
    context
}

#[get("/clients")]
pub async fn show_clients(
    user: AuthenticatedUser,
    query: web::Query<ClientsQuery>,
    repo: web::Data<InMemoryRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let query = query.into_inner();
    match client_service::list_clients(repo.get_ref(), &user, &query) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "clients");
            context.insert("clients", &data.clients);
            context.insert("filters", &data.filters);
            context.insert("query", &query);
            context.insert(
                "page_base",
                &page_base("/clients", &ClientsQuery { page: None, ..query.clone() }),
            );
            context.insert("status_options", &choices(ClientStatus::ALL, ClientStatus::label));
            context.insert("sort_options", &choices(ClientSort::ALL, ClientSort::label));
            context.insert("order_options", &choices(SortOrder::ALL, SortOrder::label));
            render_template(&tera, "clients/index.html", &context)
        }
        Err(err) => handle_service_error(err, "/dashboard"),
    }
}

#[get("/clients/export")]
pub async fn export_clients(
    user: AuthenticatedUser,
    query: web::Query<ClientsQuery>,
    repo: web::Data<InMemoryRepository>,
) -> impl Responder {
    let today = Utc::now().date_naive();
    match client_service::export_clients(repo.get_ref(), &user, &query, today) {
        Ok(file) => download(file),
        Err(err) => handle_service_error(err, "/clients"),
    }
}

#[get("/clients/new")]
pub async fn new_client(
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    if let Err(err) = authorize(&user, Feature::ManageClients) {
        return handle_service_error(err.into(), "/clients");
    }
    let context = form_context(
        &flash_messages,
        &user,
        &ClientForm::default(),
        &FieldErrors::new(),
    );
    render_template(&tera, "clients/form.html", &context)
}

#[post("/clients")]
pub async fn add_client(
    user: AuthenticatedUser,
    repo: web::Data<InMemoryRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
    web::Form(form): web::Form<ClientForm>,
) -> impl Responder {
    let echo = form.clone();
    match client_service::add_client(repo.get_ref(), &user, form) {
        Ok(client) => {
            FlashMessage::success(format!("Client {} added.", client.name)).send();
            redirect(&format!("/clients/{}", client.id))
        }
        Err(ServiceError::Validation(err)) => {
            let errors = err.field_errors();
            let mut context = form_context(&flash_messages, &user, &echo, &errors);
            insert_form_errors(&mut context, &echo, &errors);
            render_template(&tera, "clients/form.html", &context)
        }
        Err(err) => handle_service_error(err, "/clients"),
    }
}

#[get("/clients/{client_id}")]
pub async fn show_client(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<InMemoryRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let today = Utc::now().date_naive();
    match client_service::load_client(repo.get_ref(), &user, client_id.into_inner(), today) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "clients");
            context.insert("client", &data.client);
            context.insert("requests", &data.requests);
            context.insert("documents", &data.documents);
            render_template(&tera, "clients/show.html", &context)
        }
        Err(err) => handle_service_error(err, "/clients"),
    }
}

#[get("/clients/{client_id}/edit")]
pub async fn edit_client(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<InMemoryRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match client_service::load_client_form(repo.get_ref(), &user, client_id.into_inner()) {
        Ok(data) => {
            let mut context = form_context(&flash_messages, &user, &data.form, &FieldErrors::new());
            context.insert("client", &data.client);
            render_template(&tera, "clients/form.html", &context)
        }
        Err(err) => handle_service_error(err, "/clients"),
    }
}

#[post("/clients/{client_id}")]
pub async fn save_client(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<InMemoryRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
    web::Form(form): web::Form<ClientForm>,
) -> impl Responder {
    let client_id = client_id.into_inner();
    let echo = form.clone();
    match client_service::update_client(repo.get_ref(), &user, client_id, form) {
        Ok(client) => {
            FlashMessage::success("Client updated.").send();
            redirect(&format!("/clients/{}", client.id))
        }
        Err(ServiceError::Validation(err)) => {
            let errors = err.field_errors();
            let mut context = form_context(&flash_messages, &user, &echo, &errors);
            insert_form_errors(&mut context, &echo, &errors);
            context.insert("client_id", &client_id);
            render_template(&tera, "clients/form.html", &context)
        }
        Err(err) => handle_service_error(err, &format!("/clients/{client_id}")),
    }
}

#[post("/clients/{client_id}/delete")]
pub async fn delete_client(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<InMemoryRepository>,
) -> impl Responder {
    match client_service::delete_client(repo.get_ref(), &user, client_id.into_inner()) {
        Ok(()) => {
            FlashMessage::success("Client deleted.").send();
            redirect("/clients")
        }
        Err(err) => handle_service_error(err, "/clients"),
    }
}

