//! End-to-end HTTP flows against the seeded demo firm.

use actix_identity::IdentityMiddleware;
use actix_web::cookie::{Cookie, Key};
use actix_web::http::{StatusCode, header};
use actix_web::{App, test};
use serde_json::{Value, json};

use recordsdesk::auth::backend::DEMO_PASSWORD;
use recordsdesk::models::config::ServerConfig;
use recordsdesk::{AppState, flash_messages, session_middleware};

fn state() -> AppState {
    let config = ServerConfig::load("config", "test").expect("test config");
    AppState::new(config).expect("app state")
}

macro_rules! init_app {
    ($state:expr) => {{
        let key = Key::from($state.config.secret.as_bytes());
        test::init_service(
            App::new()
                .wrap(flash_messages(&key))
                .wrap(IdentityMiddleware::default())
                .wrap(session_middleware(&key, &$state.config))
                .configure(|cfg| $state.configure(cfg)),
        )
        .await
    }};
}

fn location(resp: &actix_web::dev::ServiceResponse) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn cookies(resp: &actix_web::dev::ServiceResponse) -> Vec<Cookie<'static>> {
    resp.response()
        .cookies()
        .map(|c| c.into_owned())
        .collect()
}

macro_rules! sign_in {
    ($app:expr, $role:expr) => {{
        let req = test::TestRequest::post()
            .uri("/login")
            .set_form([
                ("email", format!("{}@smithlaw.example.com", $role)),
                ("password", DEMO_PASSWORD.to_string()),
            ])
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/dashboard");
        cookies(&resp)
    }};
}

/// Replaces cookies in `jar` with the ones a response sets.
fn keep_cookies(jar: &mut Vec<Cookie<'static>>, resp: &actix_web::dev::ServiceResponse) {
    for cookie in cookies(resp) {
        jar.retain(|kept| kept.name() != cookie.name());
        jar.push(cookie);
    }
}

const BOUNDARY: &str = "recordsdesk-test-boundary";

/// `multipart/form-data` body with one `files` part per `(name, mime, size)`.
fn multipart_files(parts: &[(&str, &str, usize)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, mime, size) in parts {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{name}\"\r\nContent-Type: {mime}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.resize(body.len() + size, b'%');
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(body: Vec<u8>) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/documents/upload")
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body)
}

fn with_cookies(mut req: test::TestRequest, cookies: &[Cookie<'static>]) -> test::TestRequest {
    for cookie in cookies {
        req = req.cookie(cookie.clone());
    }
    req
}

#[actix_web::test]
async fn protected_pages_redirect_to_login() {
    let state = state();
    let app = init_app!(state);

    for path in ["/dashboard", "/clients", "/documents/upload", "/settings"] {
        let req = test::TestRequest::get().uri(path).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&resp), "/login", "{path}");
    }
}

#[actix_web::test]
async fn public_pages_render() {
    let state = state();
    let app = init_app!(state);

    for path in ["/login", "/forgot-password", "/onboarding"] {
        let req = test::TestRequest::get().uri(path).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "{path}");
    }
}

#[actix_web::test]
async fn unknown_path_is_not_found() {
    let state = state();
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/no/such/page").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn wrong_password_returns_to_login() {
    let state = state();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/login")
        .set_form([("email", "admin@smithlaw.example.com"), ("password", "nope")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
}

#[actix_web::test]
async fn signed_in_admin_sees_every_page() {
    let state = state();
    let app = init_app!(state);
    let session = sign_in!(app, "admin");

    for path in [
        "/dashboard",
        "/clients",
        "/clients/1",
        "/clients/1/edit",
        "/clients/new",
        "/providers",
        "/providers/1",
        "/requests",
        "/documents",
        "/documents/1",
        "/documents/upload",
        "/reports",
        "/settings",
        "/documentation",
    ] {
        let req = with_cookies(test::TestRequest::get().uri(path), &session).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "{path}");
    }
}

#[actix_web::test]
async fn viewer_cannot_open_management_pages() {
    let state = state();
    let app = init_app!(state);
    let session = sign_in!(app, "viewer");

    let req = with_cookies(test::TestRequest::get().uri("/clients/new"), &session).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/dashboard");

    let req = with_cookies(test::TestRequest::get().uri("/settings"), &session).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "/dashboard");
}

#[actix_web::test]
async fn client_export_is_a_csv_attachment() {
    let state = state();
    let app = init_app!(state);
    let session = sign_in!(app, "attorney");

    let req = with_cookies(
        test::TestRequest::get().uri("/clients/export?status=active"),
        &session,
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(
        resp.headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .starts_with("attachment")
    );

    let body = test::read_body(resp).await;
    let text = String::from_utf8(body.to_vec()).unwrap();
    let mut lines = text.lines();
    assert!(lines.next().unwrap().starts_with("id,name,email"));
    assert_eq!(lines.count(), 5);
}

#[actix_web::test]
async fn invalid_client_form_is_rendered_again() {
    let state = state();
    let app = init_app!(state);
    let session = sign_in!(app, "admin");

    let req = with_cookies(test::TestRequest::post().uri("/clients"), &session)
        .set_form([
            ("name", "Jane Roe"),
            ("email", "not-an-email"),
            ("case_number", "CASE-9"),
            ("status", "active"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("Enter a valid email address."));
}

#[actix_web::test]
async fn api_requires_a_session() {
    let state = state();
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/api/v1/clients").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn api_upload_intake_and_removal() {
    let state = state();
    let app = init_app!(state);
    let session = sign_in!(app, "paralegal");

    let too_many: Vec<Value> = (0..11)
        .map(|i| json!({"name": format!("f{i}.pdf"), "mime_type": "application/pdf", "size": 10}))
        .collect();
    let req = with_cookies(test::TestRequest::post().uri("/api/v1/uploads"), &session)
        .set_json(json!({ "files": too_many }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = with_cookies(test::TestRequest::post().uri("/api/v1/uploads"), &session)
        .set_json(json!({ "files": [
            {"name": "mri.pdf", "mime_type": "application/pdf", "size": 2048},
            {"name": "notes.docx", "mime_type": "application/msword", "size": 2048},
        ]}))
        .to_request();
    let outcome: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(outcome["accepted"].as_array().unwrap().len(), 1);
    assert_eq!(outcome["rejected"].as_array().unwrap().len(), 1);
    let id = outcome["accepted"][0].as_str().unwrap().to_string();

    let req = with_cookies(test::TestRequest::get().uri("/api/v1/uploads"), &session).to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["items"].as_array().unwrap().len(), 2);
    assert_eq!(view["active"], json!(true));

    let req = with_cookies(
        test::TestRequest::delete().uri(&format!("/api/v1/uploads/{id}")),
        &session,
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = with_cookies(test::TestRequest::get().uri("/api/v1/uploads"), &session).to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["items"].as_array().unwrap().len(), 1);
    assert_eq!(view["active"], json!(false));
}

#[actix_web::test]
async fn browser_upload_queues_large_selection_and_flags_bad_files() {
    let state = state();
    let app = init_app!(state);
    let mut jar = sign_in!(app, "paralegal");

    const MIB: usize = 1024 * 1024;
    let body = multipart_files(&[
        ("mri.pdf", "application/pdf", 25 * MIB),
        ("xray.png", "image/png", 25 * MIB),
        ("billing.pdf", "application/pdf", 25 * MIB),
        ("notes.txt", "text/plain", 64),
    ]);
    let resp = test::call_service(&app, with_cookies(upload_request(body), &jar).to_request()).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/documents/upload");
    keep_cookies(&mut jar, &resp);

    let req = with_cookies(test::TestRequest::get().uri("/api/v1/uploads"), &jar).to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    let items = view["items"].as_array().unwrap();
    assert_eq!(items.len(), 4);
    let queued = items.iter().filter(|item| item["state"] == json!("queued")).count();
    assert_eq!(queued, 3);

    let req = with_cookies(test::TestRequest::get().uri("/documents/upload"), &jar).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(page.contains("notes.txt: unsupported file type"));
    assert!(page.contains("3 file(s) queued for upload."));
}

#[actix_web::test]
async fn browser_upload_of_eleven_files_reports_the_batch_limit() {
    let state = state();
    let app = init_app!(state);
    let mut jar = sign_in!(app, "paralegal");

    let names: Vec<String> = (0..11).map(|i| format!("page{i}.pdf")).collect();
    let parts: Vec<(&str, &str, usize)> = names
        .iter()
        .map(|name| (name.as_str(), "application/pdf", 6 * 1024 * 1024))
        .collect();
    let resp = test::call_service(
        &app,
        with_cookies(upload_request(multipart_files(&parts)), &jar).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/documents/upload");
    keep_cookies(&mut jar, &resp);

    let req = with_cookies(test::TestRequest::get().uri("/documents/upload"), &jar).to_request();
    let page = String::from_utf8(test::read_body(test::call_service(&app, req).await).await.to_vec())
        .unwrap();
    assert!(page.contains("You selected 11 files. Please upload at most 10 files at a time."));

    let req = with_cookies(test::TestRequest::get().uri("/api/v1/uploads"), &jar).to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert!(view["items"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn unreadable_upload_body_redirects_with_a_message() {
    let state = state();
    let app = init_app!(state);
    let mut jar = sign_in!(app, "paralegal");

    let req = with_cookies(test::TestRequest::post().uri("/documents/upload"), &jar)
        .insert_header((header::CONTENT_TYPE, "multipart/form-data"))
        .set_payload("not a multipart body")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/documents/upload");
    keep_cookies(&mut jar, &resp);

    let req = with_cookies(test::TestRequest::get().uri("/documents/upload"), &jar).to_request();
    let page = String::from_utf8(test::read_body(test::call_service(&app, req).await).await.to_vec())
        .unwrap();
    assert!(page.contains("The selected files could not be uploaded."));
}
