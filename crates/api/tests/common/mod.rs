//! Shared helpers for the API integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

use sanjesh_api::auth::jwt::{generate_access_token, JwtConfig};
use sanjesh_api::config::{ServerConfig, DEFAULT_MAX_UPLOAD_BYTES};
use sanjesh_api::router::build_app_router;
use sanjesh_api::state::{AppState, GeoLookups};
use sanjesh_core::attachments::LocalAttachmentStore;
use sanjesh_core::roles::Role;
use sanjesh_core::types::DbId;

const TEST_JWT_SECRET: &str = "test-secret-for-integration-tests";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(attachment_dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        form_step_count: 3,
        attachment_dir: attachment_dir.to_path_buf(),
        max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        jwt: JwtConfig::with_secret(TEST_JWT_SECRET),
    }
}

/// The full application router plus the temporary attachment directory it
/// writes to. The directory is removed when the value is dropped.
pub struct TestApp {
    pub router: Router,
    pub attachments: TempDir,
}

impl TestApp {
    /// Files currently held by the attachment store.
    pub fn stored_files(&self) -> usize {
        std::fs::read_dir(self.attachments.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

/// Build the application exactly as `main.rs` does, against `pool`.
pub fn build_test_app(pool: PgPool) -> TestApp {
    let attachments = tempfile::tempdir().unwrap();
    let config = test_config(attachments.path());

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        attachments: Arc::new(LocalAttachmentStore::new(attachments.path())),
        lookups: Arc::new(GeoLookups::new()),
    };

    TestApp {
        router: build_app_router(state, &config),
        attachments,
    }
}

/// An app whose pool never connects. Only usable for requests rejected
/// before any query runs.
pub fn build_offline_app() -> TestApp {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://offline@localhost:1/offline")
        .unwrap();
    build_test_app(pool)
}

/// A bearer token for `user_id` with `role`, signed with the test secret.
pub fn token_for(user_id: DbId, role: Role) -> String {
    generate_access_token(user_id, role, &JwtConfig::with_secret(TEST_JWT_SECRET)).unwrap()
}

async fn send(app: &TestApp, request: Request<Body>) -> Response<Body> {
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &TestApp, uri: &str, token: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

pub async fn send_json(
    app: &TestApp,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: &Value,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

pub async fn post_json(app: &TestApp, uri: &str, token: Option<&str>, body: &Value) -> Response<Body> {
    send_json(app, Method::POST, uri, token, body).await
}

/// A file part of a multipart request: `(part name, file name, bytes)`.
pub type FilePart<'a> = (&'a str, &'a str, &'a [u8]);

/// POST a `multipart/form-data` body with a `responses` part and file parts.
pub async fn post_multipart(
    app: &TestApp,
    uri: &str,
    token: &str,
    responses: &Value,
    files: &[FilePart<'_>],
) -> Response<Body> {
    const BOUNDARY: &str = "sanjesh-test-boundary";

    let mut body: Vec<u8> = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"responses\"\r\n\
             Content-Type: application/json\r\n\r\n{responses}\r\n"
        )
        .as_bytes(),
    );
    for (name, file_name, data) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
                 filename=\"{file_name}\"\r\nContent-Type: application/pdf\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Seed data
// ---------------------------------------------------------------------------

/// Insert a province, a district in it and an exam center in that district.
/// Returns `(province_id, district_id, exam_center_id)`.
pub async fn seed_geography(pool: &PgPool) -> (DbId, DbId, DbId) {
    let province_id: DbId =
        sqlx::query_scalar("INSERT INTO provinces (name) VALUES ('اصفهان') RETURNING id")
            .fetch_one(pool)
            .await
            .unwrap();
    let district_id: DbId = sqlx::query_scalar(
        "INSERT INTO districts (province_id, name) VALUES ($1, 'ناحیه ۳') RETURNING id",
    )
    .bind(province_id)
    .fetch_one(pool)
    .await
    .unwrap();
    let exam_center_id: DbId = sqlx::query_scalar(
        "INSERT INTO exam_centers (district_id, name, gender, period, organization_type)
         VALUES ($1, 'حوزه ۷', 'پسر', 'متوسطه دوم', 'دولتی')
         RETURNING id",
    )
    .bind(district_id)
    .fetch_one(pool)
    .await
    .unwrap();
    (province_id, district_id, exam_center_id)
}

pub async fn seed_user(
    pool: &PgPool,
    username: &str,
    role: Role,
    district_id: Option<DbId>,
    exam_center_id: Option<DbId>,
) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO users (username, role, district_id, exam_center_id)
         VALUES ($1, $2, $3, $4)
         RETURNING id",
    )
    .bind(username)
    .bind(role.as_str())
    .bind(district_id)
    .bind(exam_center_id)
    .fetch_one(pool)
    .await
    .unwrap()
}
