use actix_web::{Responder, get, web};
use actix_web_flash_messages::IncomingFlashMessages;
use tera::Tera;

use crate::domain::auth::AuthenticatedUser;
use crate::repository::InMemoryRepository;
use crate::routes::{base_context, handle_service_error, render_template};
use crate::services::settings as settings_service;

#[get("/settings")]
pub async fn show_settings(
    user: AuthenticatedUser,
    repo: web::Data<InMemoryRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match settings_service::load_settings(repo.get_ref(), &user) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, &user, "settings");
            context.insert("firm", &data.firm);
            context.insert("role", &data.role);
            context.insert("role_label", data.role.label());
            context.insert("features", &data.features);
            render_template(&tera, "settings.html", &context)
        }
        Err(err) => handle_service_error(err, "/dashboard"),
    }
}
