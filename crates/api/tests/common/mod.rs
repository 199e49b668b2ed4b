#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use briefdesk_api::auth::jwt::JwtConfig;
use briefdesk_api::config::ServerConfig;
use briefdesk_api::router::build_app_router;
use briefdesk_api::state::AppState;
use briefdesk_api::uploads::UploadStore;
use briefdesk_db::DbPool;
use briefdesk_events::EventBus;

pub const TEST_SECRET: &str = "test-secret-for-integration-tests";
pub const STRONG_PASSWORD: &str = "Sunflower42!";
pub const MULTIPART_BOUNDARY: &str = "briefdesk-test-boundary";

/// Build a test `ServerConfig` with safe defaults rooted in `root`.
pub fn test_config(root: &std::path::Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            session_expiry_days: 7,
            reset_expiry_mins: 15,
        },
        data_path: root.join("db.json"),
        upload_dir: root.join("uploads"),
        public_dir: root.join("public"),
        max_upload_mb: 5,
        trial_days: 14,
        plan_monthly_price_usd: 200,
        frontend_url: "http://localhost:5173".to_string(),
    }
}

/// A running application over an in-memory store and a scratch directory.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub upload_dir: PathBuf,
    _root: TempDir,
}

impl TestApp {
    pub fn pool(&self) -> &DbPool {
        &self.state.pool
    }

    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Build the full application router with all middleware layers.
///
/// Uses the same `build_app_router` as `main.rs` so integration tests
/// exercise the production middleware stack.
pub fn build_test_app() -> TestApp {
    let root = tempfile::tempdir().expect("tempdir");
    let config = test_config(root.path());

    std::fs::create_dir_all(&config.public_dir).expect("public dir");
    std::fs::write(
        config.public_dir.join("index.html"),
        "<!doctype html><title>briefdesk</title>",
    )
    .expect("index.html");

    let state = AppState {
        pool: briefdesk_db::in_memory_store(),
        config: Arc::new(config.clone()),
        event_bus: Arc::new(EventBus::default()),
        uploads: Arc::new(UploadStore::new(&config.upload_dir)),
    };

    TestApp {
        router: build_app_router(state.clone(), &config),
        state,
        upload_dir: config.upload_dir,
        _root: root,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("request should not fail")
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::get(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    json_request(app, Method::POST, uri, None, body).await
}

pub async fn post_json_auth(app: Router, uri: &str, token: &str, body: Value) -> Response {
    json_request(app, Method::POST, uri, Some(token), body).await
}

pub async fn put_json_auth(app: Router, uri: &str, token: &str, body: Value) -> Response {
    json_request(app, Method::PUT, uri, Some(token), body).await
}

pub async fn post_empty_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::post(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::delete(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

async fn json_request(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Value,
) -> Response {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

/// POST a multipart body with one `files` part per `(name, content)` pair.
pub async fn post_files_auth(
    app: Router,
    uri: &str,
    token: &str,
    files: &[(&str, &[u8])],
) -> Response {
    let mut body = Vec::new();
    for (name, content) in files {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"files\"; filename=\"{name}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());

    let request = Request::post(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

/// Assert the status and return the JSON body.
pub async fn expect_json(response: Response, status: StatusCode) -> Value {
    let actual = response.status();
    let json = body_json(response).await;
    assert_eq!(actual, status, "unexpected status, body: {json}");
    json
}

// ---------------------------------------------------------------------------
// Account helpers
// ---------------------------------------------------------------------------

/// Sign up a brand account through the API and return its session token.
pub async fn signup_brand(app: &TestApp, email: &str) -> String {
    let body = json!({
        "firstName": "Bea",
        "lastName": "Brand",
        "email": email,
        "password": STRONG_PASSWORD,
        "businessName": format!("{email} studio"),
        "industry": "Retail",
    });
    let json = expect_json(
        post_json(app.app(), "/api/auth/signup", body).await,
        StatusCode::OK,
    )
    .await;
    json["token"].as_str().expect("token").to_string()
}

/// Sign up a staff account through the API and return its session token.
pub async fn signup_staff(app: &TestApp, email: &str) -> String {
    let body = json!({
        "firstName": "Sam",
        "lastName": "Staff",
        "email": email,
        "password": STRONG_PASSWORD,
    });
    let json = expect_json(
        post_json(app.app(), "/api/auth/staff-signup", body).await,
        StatusCode::OK,
    )
    .await;
    json["token"].as_str().expect("token").to_string()
}

/// Create a project for the brand behind `token` and return its id.
pub async fn create_project(app: &TestApp, token: &str, name: &str) -> String {
    let json = expect_json(
        post_json_auth(app.app(), "/api/projects", token, json!({ "name": name })).await,
        StatusCode::CREATED,
    )
    .await;
    json["project"]["id"].as_str().expect("project id").to_string()
}
