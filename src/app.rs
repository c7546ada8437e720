//! Application wiring: shared state, middleware and the HTTP server.

use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_cors::Cors;
use actix_files::Files;
use actix_identity::IdentityMiddleware;
use actix_multipart::form::MultipartFormConfig;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::middleware::from_fn;
use actix_web::{App, HttpServer, middleware, web};
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
use tera::Tera;

use crate::auth::backend::{AuthBackend, DemoAuthBackend};
use crate::domain::types::FirmId;
use crate::domain::upload::{MAX_BATCH_FILES, MAX_FILE_SIZE};
use crate::middleware::redirect_unauthorized;
use crate::models::config::ServerConfig;
use crate::repository::InMemoryRepository;
use crate::repository::seed::{DEMO_FIRM_ID, DEMO_FIRM_NAME};
use crate::routes::api::{
    api_v1_clients, api_v1_create_uploads, api_v1_delete_upload, api_v1_uploads,
};
use crate::routes::auth::{
    forgot_password, login, reset_password, show_forgot_password, show_login,
    show_reset_password,
};
use crate::routes::clients::{
    add_client, delete_client, edit_client, export_clients, new_client, save_client, show_client,
    show_clients,
};
use crate::routes::documents::{delete_document, show_document, show_documents};
use crate::routes::main::{
    documentation, export_dashboard, index, logout, not_found, show_dashboard,
};
use crate::routes::onboarding::{register_firm, show_onboarding};
use crate::routes::providers::{add_provider, new_provider, show_provider, show_providers};
use crate::routes::reports::show_reports;
use crate::routes::requests::{bulk_update_status, create_request, show_requests, update_status};
use crate::routes::settings::show_settings;
use crate::routes::uploads::{multipart_error, show_upload, upload_documents};
use crate::upload_queue::UploadQueue;

/// Everything the handlers share, built once per process.
#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    pub repo: InMemoryRepository,
    pub auth: Arc<dyn AuthBackend>,
    pub uploads: Arc<UploadQueue>,
    pub tera: Tera,
}

impl AppState {
    /// Parses templates and, unless disabled, seeds the demo firm.
    pub fn new(config: ServerConfig) -> std::io::Result<Self> {
        let tera = Tera::new(&config.templates_dir)
            .map_err(|e| std::io::Error::other(format!("Template parsing error(s): {e}")))?;

        let (repo, auth) = if config.seed_demo_data {
            let repo = InMemoryRepository::seeded()
                .map_err(|e| std::io::Error::other(format!("Failed to seed demo data: {e}")))?;
            let firm_id = FirmId::new(DEMO_FIRM_ID).map_err(std::io::Error::other)?;
            let auth = DemoAuthBackend::seeded(firm_id, DEMO_FIRM_NAME)
                .map_err(|e| std::io::Error::other(format!("Failed to seed accounts: {e}")))?;
            log::info!("Seeded demo firm {DEMO_FIRM_NAME}");
            (repo, auth)
        } else {
            (InMemoryRepository::new(), DemoAuthBackend::new())
        };

        Ok(Self {
            config,
            repo,
            auth: Arc::new(auth),
            uploads: Arc::new(UploadQueue::new()),
            tera,
        })
    }

    /// Registers shared data, every route and the not-found fallback.
    ///
    /// Session, identity and flash middleware must wrap the `App` itself;
    /// see [`session_middleware`] and [`flash_messages`].
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        // Room for one file over the batch limit so the batch rule can fire.
        let multipart_limit = (MAX_BATCH_FILES + 1) * (MAX_FILE_SIZE as usize + 1024 * 1024);

        cfg.app_data(web::Data::new(self.tera.clone()))
            .app_data(web::Data::new(self.repo.clone()))
            .app_data(web::Data::from(self.auth.clone()))
            .app_data(web::Data::new(self.uploads.clone()))
            .app_data(web::Data::new(self.config.clone()))
            .app_data(
                MultipartFormConfig::default()
                    .total_limit(multipart_limit)
                    .error_handler(multipart_error),
            )
            .service(Files::new("/assets", &self.config.assets_dir))
            .service(show_login)
            .service(login)
            .service(show_forgot_password)
            .service(forgot_password)
            .service(show_reset_password)
            .service(reset_password)
            .service(show_onboarding)
            .service(register_firm)
            .service(
                web::scope("/api")
                    .service(api_v1_clients)
                    .service(api_v1_uploads)
                    .service(api_v1_create_uploads)
                    .service(api_v1_delete_upload),
            )
            .service(
                web::scope("")
                    .wrap(from_fn(redirect_unauthorized))
                    .service(index)
                    .service(show_dashboard)
                    .service(export_dashboard)
                    .service(documentation)
                    .service(show_clients)
                    .service(export_clients)
                    .service(new_client)
                    .service(add_client)
                    .service(show_client)
                    .service(edit_client)
                    .service(save_client)
                    .service(delete_client)
                    .service(show_providers)
                    .service(new_provider)
                    .service(add_provider)
                    .service(show_provider)
                    .service(show_requests)
                    .service(create_request)
                    .service(bulk_update_status)
                    .service(update_status)
                    .service(show_documents)
                    .service(show_upload)
                    .service(upload_documents)
                    .service(show_document)
                    .service(delete_document)
                    .service(show_reports)
                    .service(show_settings)
                    .service(logout),
            )
            .default_service(web::to(not_found));
    }
}

/// Cookie-backed session store used by the identity middleware.
pub fn session_middleware(
    key: &Key,
    config: &ServerConfig,
) -> SessionMiddleware<CookieSessionStore> {
    let domain = (config.domain != "localhost").then(|| format!(".{}", config.domain));
    SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
        .cookie_secure(config.cookie_secure)
        .cookie_domain(domain)
        .build()
}

pub fn flash_messages(key: &Key) -> FlashMessagesFramework {
    let message_store = CookieMessageStore::builder(key.clone()).build();
    FlashMessagesFramework::builder(message_store).build()
}

/// Drives every upload in the queue from one periodic task.
pub fn spawn_upload_clock(queue: Arc<UploadQueue>, period: Duration) {
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(period);
        loop {
            interval.tick().await;
            let advanced = queue.tick(Instant::now(), &mut rand::rng());
            if advanced > 0 {
                log::debug!("Upload clock advanced {advanced} item(s)");
            }
        }
    });
}

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    let state = AppState::new(server_config.clone())?;

    spawn_upload_clock(
        state.uploads.clone(),
        Duration::from_millis(server_config.upload_tick_ms),
    );

    // Keys for identity, sessions, and flash messages.
    let secret_key = Key::from(server_config.secret.as_bytes());

    let bind_address = (server_config.address.clone(), server_config.port);
    log::info!("Listening on {}:{}", bind_address.0, bind_address.1);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(flash_messages(&secret_key))
            .wrap(IdentityMiddleware::default())
            .wrap(session_middleware(&secret_key, &state.config))
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .configure(|cfg| state.configure(cfg))
    })
    .bind(bind_address)?
    .run()
    .await
}
