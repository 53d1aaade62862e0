pub mod health;
pub mod project;

use axum::Router;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /projects/create                                 create
/// /projects/room/{room_id}                         list by room (?status=)
/// /projects/{project_id}                           get with files
/// /projects/{project_id}/status                    change status (PATCH)
/// /projects/{project_id}/files                     list files
/// /projects/{project_id}/files/paste               paste file (POST)
/// /projects/{project_id}/files/upload              upload file (POST, multipart)
/// /projects/{project_id}/files/{file_id}           replace content (PUT)
/// /projects/{project_id}/compile                   compile (POST)
/// /projects/{project_id}/preview                   compiled document (text/html)
/// /projects/{project_id}/{filename}                raw file content
/// ```
pub fn api_routes(config: &ServerConfig) -> Router<AppState> {
    Router::new().nest("/projects", project::router(config.max_upload_bytes))
}
