use actix_web::{Responder, get, web};
use actix_web_flash_messages::IncomingFlashMessages;
use tera::Tera;

use crate::domain::auth::AuthenticatedUser;
use crate::repository::InMemoryRepository;
use crate::routes::{base_context, handle_service_error, render_template};
use crate::services::reports as report_service;

#[get("/reports")]
pub async fn show_reports(
    user: AuthenticatedUser,
    repo: web::Data<InMemoryRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match report_service::load_reports(repo.get_ref(), &user) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "reports");
            context.insert("report", &data);
            render_template(&tera, "reports.html", &context)
        }
        Err(err) => handle_service_error(err, "/dashboard"),
    }
}
