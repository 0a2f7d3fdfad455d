#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use patent_guard::AppState;
use patent_guard::api::create_router;
use patent_guard::config::{DatabaseBackend, Environment, Settings};

pub const JWT_SECRET: &str = "integration-test-secret-at-least-32-characters";
pub const WEBHOOK_SECRET: &str = "whsec_integration";
pub const PASSWORD: &str = "correct-horse-battery";

/// A router over the in-memory backend. Uploads go to a temporary directory
/// that lives as long as the app.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    _uploads: TempDir,
}

pub fn settings() -> Settings {
    let mut settings = Settings::default();
    settings.database.backend = DatabaseBackend::Memory;
    settings.jwt.secret = JWT_SECRET.to_string();
    settings.payments.webhook_secret = WEBHOOK_SECRET.to_string();
    settings
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_settings(settings()).await
    }

    pub async fn with_settings(mut settings: Settings) -> Self {
        let uploads = tempfile::tempdir().unwrap();
        settings.storage.upload_dir = uploads.path().to_string_lossy().into_owned();
        let state = AppState::build(settings, Environment::Test).await.unwrap();
        Self {
            router: create_router(state.clone()),
            state,
            _uploads: uploads,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response<Body> {
        self.send(authed(Request::builder().method("GET").uri(uri), token).body(Body::empty()).unwrap())
            .await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Response<Body> {
        self.send(authed(Request::builder().method("DELETE").uri(uri), token).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_json(&self, uri: &str, body: Value, token: Option<&str>) -> Response<Body> {
        let request = authed(Request::builder().method("POST").uri(uri), token)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn register(&self, email: &str) -> Response<Body> {
        self.post_json(
            "/api/auth/register",
            json!({ "email": email, "password": PASSWORD, "full_name": "Test User" }),
            None,
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Response<Body> {
        let request = Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("username={email}&password={password}")))
            .unwrap();
        self.send(request).await
    }

    /// Registers `email` and returns an access token for it.
    pub async fn signed_in(&self, email: &str) -> String {
        let response = self.register(email).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let response = self.login(email, PASSWORD).await;
        assert_eq!(response.status(), StatusCode::OK);
        json_body(response).await["access_token"]
            .as_str()
            .unwrap()
            .to_string()
    }
}

fn authed(builder: axum::http::request::Builder, token: Option<&str>) -> axum::http::request::Builder {
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
        None => builder,
    }
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn text_body(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// A multipart upload with `file`, `title` and optionally `description`.
pub fn multipart_upload(filename: &str, contents: &str, title: Option<&str>, token: &str) -> Request<Body> {
    const BOUNDARY: &str = "patent-guard-test-boundary";
    let mut body = String::new();
    body.push_str(&format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: text/plain\r\n\r\n{contents}\r\n"
    ));
    if let Some(title) = title {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\n{title}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    Request::builder()
        .method("POST")
        .uri("/api/documents")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}
