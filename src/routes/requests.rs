use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use chrono::{NaiveDate, Utc};
use tera::{Context, Tera};

use crate::domain::auth::AuthenticatedUser;
use crate::domain::request::{RequestPriority, RequestStatus, RequestType};
use crate::dto::choices;
use crate::dto::requests::{RequestsPageData, RequestsQuery};
use crate::forms::FieldErrors;
use crate::forms::request::{BulkStatusForm, NewRequestForm, RequestStatusForm};
use crate::policy::{Feature, is_permitted};
use crate::repository::{InMemoryRepository, RequestSort, SortOrder};
use crate::routes::{
    base_context, handle_service_error, insert_form_errors, page_base, redirect, render_template,
};
use crate::services::ServiceError;
use crate::services::requests as request_service;

fn list_context(
    flash_messages: &IncomingFlashMessages,
    user: &AuthenticatedUser,
    query: &RequestsQuery,
    data: &RequestsPageData,
) -> Context {
    let mut context = base_context(flash_messages, user, "requests");
    context.insert("requests", &data.requests);
    context.insert("filters", &data.filters);
    context.insert("query", query);
    context.insert(
        "page_base",
        &page_base("/requests", &RequestsQuery { page: None, ..query.clone() }),
    );
    context.insert("client_options", &data.client_options);
    context.insert("provider_options", &data.provider_options);
    context.insert("status_options", &choices(RequestStatus::ALL, RequestStatus::label));
    context.insert(
        "priority_options",
        &choices(RequestPriority::ALL, RequestPriority::label),
    );
    context.insert("type_options", &choices(RequestType::ALL, RequestType::label));
    context.insert("sort_options", &choices(RequestSort::ALL, RequestSort::label));
    context.insert("order_options", &choices(SortOrder::ALL, SortOrder::label));
    context.insert("can_manage", &is_permitted(user.role, Feature::ManageRequests));
    context.insert("form", &NewRequestForm::default());
    context.insert("errors", &FieldErrors::new());
    context
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[get("/requests")]
pub async fn show_requests(
    user: AuthenticatedUser,
    query: web::Query<RequestsQuery>,
    repo: web::Data<InMemoryRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let query = query.into_inner();
    match request_service::list_requests(repo.get_ref(), &user, &query, today()) {
        Ok(data) => {
            let context = list_context(&flash_messages, &user, &query, &data);
            render_template(&tera, "requests/index.html", &context)
        }
        Err(err) => handle_service_error(err, "/dashboard"),
    }
}

#[post("/requests")]
pub async fn create_request(
    user: AuthenticatedUser,
    repo: web::Data<InMemoryRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
    web::Form(form): web::Form<NewRequestForm>,
) -> impl Responder {
    let echo = form.clone();
    match request_service::create_request(repo.get_ref(), &user, form) {
        Ok(request) => {
            FlashMessage::success(format!("Request #{} created.", request.id)).send();
            redirect("/requests")
        }
        Err(ServiceError::Validation(err)) => {
            let query = RequestsQuery::default();
            match request_service::list_requests(repo.get_ref(), &user, &query, today()) {
                Ok(data) => {
                    let mut context = list_context(&flash_messages, &user, &query, &data);
                    insert_form_errors(&mut context, &echo, &err.field_errors());
                    context.insert("show_form", &true);
                    render_template(&tera, "requests/index.html", &context)
                }
                Err(err) => handle_service_error(err, "/requests"),
            }
        }
        Err(err) => handle_service_error(err, "/requests"),
    }
}

#[post("/requests/bulk-status")]
pub async fn bulk_update_status(
    user: AuthenticatedUser,
    repo: web::Data<InMemoryRepository>,
    body: web::Bytes,
) -> impl Responder {
    let form: BulkStatusForm = match serde_html_form::from_bytes(&body) {
        Ok(form) => form,
        Err(err) => {
            log::warn!("Malformed bulk status form: {err}");
            FlashMessage::error("Select at least one request and a status.").send();
            return redirect("/requests");
        }
    };

    match request_service::bulk_update_status(repo.get_ref(), &user, form) {
        Ok(updated) => {
            FlashMessage::success(format!("Updated {updated} request(s).")).send();
            redirect("/requests")
        }
        Err(ServiceError::Validation(_)) => {
            FlashMessage::error("Select at least one request and a status.").send();
            redirect("/requests")
        }
        Err(err) => handle_service_error(err, "/requests"),
    }
}

#[post("/requests/{request_id}/status")]
pub async fn update_status(
    request_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<InMemoryRepository>,
    web::Form(form): web::Form<RequestStatusForm>,
) -> impl Responder {
    match request_service::update_status(repo.get_ref(), &user, request_id.into_inner(), form) {
        Ok(request) => {
            FlashMessage::success(format!(
                "Request #{} is now {}.",
                request.id,
                request.status.label()
            ))
            .send();
            redirect("/requests")
        }
        Err(err) => handle_service_error(err, "/requests"),
    }
}
