#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use collab_core::membership::MembershipPolicy;
use collab_db::{MemoryStore, ProjectRegistry};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use collab_api::config::ServerConfig;
use collab_api::router::build_app_router;
use collab_api::state::AppState;

const MULTIPART_BOUNDARY: &str = "collab-test-boundary";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default),
/// a 30-second request timeout and the in-memory store.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        max_upload_bytes: collab_core::file_types::MAX_UPLOAD_BYTES,
        auto_enroll_editors: true,
        database_url: None,
    }
}

/// Build the full application router over a fresh in-memory registry.
///
/// Uses the same builder as `main.rs`, so tests exercise the production
/// middleware stack. The returned router is cheap to clone and every clone
/// shares the same registry.
pub fn build_test_app() -> Router {
    build_app_with(test_config())
}

pub fn build_app_with(config: ServerConfig) -> Router {
    let registry = ProjectRegistry::new(
        Arc::new(MemoryStore::new()),
        MembershipPolicy {
            auto_enroll: config.auto_enroll_editors,
        },
    );
    let state = AppState {
        registry: Arc::new(registry),
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn json_request(app: Router, method: Method, uri: &str, body: Value) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    json_request(app, Method::POST, uri, body).await
}

pub async fn put_json(app: Router, uri: &str, body: Value) -> Response {
    json_request(app, Method::PUT, uri, body).await
}

pub async fn patch_json(app: Router, uri: &str, body: Value) -> Response {
    json_request(app, Method::PATCH, uri, body).await
}

/// POST a multipart form with one `file` part plus plain text fields.
pub async fn post_multipart(
    app: Router,
    uri: &str,
    file: Option<(&str, &str)>,
    fields: &[(&str, &str)],
) -> Response {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    if let Some((file_name, content)) = file {
        body.push_str(&format!(
            "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n{content}\r\n"
        ));
    }
    body.push_str(&format!("--{MULTIPART_BOUNDARY}--\r\n"));

    let request = Request::post(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

pub fn content_type(response: &Response) -> String {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Create a project owned by `ana` in `room-1` and return its id.
pub async fn create_project(app: &Router, name: &str) -> String {
    let response = post_json(
        app.clone(),
        "/api/projects/create",
        serde_json::json!({
            "name": name,
            "roomId": "room-1",
            "createdBy": "ana",
        }),
    )
    .await;
    let json = body_json(response).await;
    json["project"]["projectId"].as_str().unwrap().to_string()
}

/// Paste a file as `ana` and return the response.
pub async fn paste_file(
    app: &Router,
    project_id: &str,
    file_name: &str,
    file_type: &str,
    content: &str,
) -> Response {
    post_json(
        app.clone(),
        &format!("/api/projects/{project_id}/files/paste"),
        serde_json::json!({
            "fileName": file_name,
            "fileType": file_type,
            "content": content,
            "uploadedBy": "ana",
        }),
    )
    .await
}
