//! Shared helpers for integration tests.
//!
//! Every test gets its own in-memory SQLite database with all migrations
//! applied, and an image store rooted in a temporary directory.

#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use migration::{Migrator, MigratorTrait};
use ong::{
    auth::issue_token,
    config::AppConfig,
    mail::{MailError, MailMessage, Mailer},
    pagination::PaginationUriBuilder,
    server::{AppState, create_app},
    storage::LocalImageStore,
};
use sea_orm::{Database, DatabaseConnection};
use serde_json::Value;
use tempfile::TempDir;
use tokio::sync::Mutex;
use tower::ServiceExt;

pub const TEST_BASE_URL: &str = "https://test";
pub const TEST_JWT_SECRET: &str = "integration-test-secret-with-enough-bytes";
pub const MULTIPART_BOUNDARY: &str = "ong-test-boundary";

/// Sets up an in-memory SQLite database with all migrations applied.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

pub fn test_config() -> AppConfig {
    AppConfig {
        profile: "test".to_string(),
        public_base_url: TEST_BASE_URL.to_string(),
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ..AppConfig::default()
    }
}

/// Mailer that keeps every message for later assertions
#[derive(Debug, Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<MailMessage>>,
}

#[async_trait::async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        self.sent.lock().await.push(message.clone());
        Ok(())
    }
}

/// Router plus the resources behind it
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
    pub uploads: TempDir,
}

impl TestApp {
    pub async fn new() -> Result<Self> {
        Self::with_config(test_config()).await
    }

    /// Same as [`TestApp::new`] with roles, demo users and the organization seeded.
    pub async fn seeded() -> Result<Self> {
        let app = Self::new().await?;
        ong::seeds::seed_all(&app.state.db).await?;
        Ok(app)
    }

    pub async fn with_config(config: AppConfig) -> Result<Self> {
        let db = setup_test_db().await?;
        let uploads = TempDir::new()?;
        let mailer = Arc::new(RecordingMailer::default());

        let state = AppState {
            uri_builder: Arc::new(PaginationUriBuilder::new(&config.public_base_url)?),
            image_store: Arc::new(LocalImageStore::new(uploads.path(), config.asset_base_url())),
            mailer: mailer.clone(),
            config: Arc::new(config),
            db,
        };

        Ok(Self {
            router: create_app(state.clone()),
            state,
            mailer,
            uploads,
        })
    }

    /// Bearer token for `user_id`, signed with the app's secret.
    pub fn token_for(&self, user_id: i32, email: &str, role: &str) -> String {
        issue_token(&self.state.config, user_id, email, role).expect("token issues")
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response is JSON")
        };
        (status, body)
    }
}

/// Builds a request, attaching the bearer token when given.
pub fn request(method: Method, uri: &str, token: Option<&str>, body: Body) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(body).expect("request builds")
}

pub fn json_request(method: Method, uri: &str, payload: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request builds")
}

/// File part of a multipart form
pub struct FilePart<'a> {
    pub name: &'a str,
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub bytes: &'a [u8],
}

/// Encodes text fields and an optional file as `multipart/form-data`.
pub fn multipart_body(fields: &[(&str, &str)], file: Option<FilePart<'_>>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(file) = file {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                file.name, file.file_name, file.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(file.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Vec<u8>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body)).expect("request builds")
}
