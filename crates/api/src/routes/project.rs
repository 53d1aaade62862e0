//! Route definitions for the `/projects` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, patch, post, put};
use axum::Router;

use crate::handlers::{compilation, project, project_file};
use crate::state::AppState;

/// Multipart framing allowance on top of the file size limit. The exact
/// file size is checked after the part is read.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Routes mounted at `/projects`.
///
/// Static segments take priority over `{filename}`, so a stored file named
/// `files`, `status`, `compile` or `preview` cannot be served raw.
///
/// ```text
/// POST   /create                            -> project::create
/// GET    /room/{room_id}                    -> project::list_by_room
/// GET    /{project_id}                      -> project::get_by_id
/// PATCH  /{project_id}/status               -> project::update_status
///
/// GET    /{project_id}/files                -> project_file::list
/// POST   /{project_id}/files/paste          -> project_file::paste
/// POST   /{project_id}/files/upload         -> project_file::upload
/// PUT    /{project_id}/files/{file_id}      -> project_file::update
///
/// POST   /{project_id}/compile              -> compilation::compile
/// GET    /{project_id}/preview              -> compilation::preview
///
/// GET    /{project_id}/{filename}           -> project_file::serve_raw
/// ```
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    let upload_limit =
        DefaultBodyLimit::max(max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES));

    Router::new()
        .route("/create", post(project::create))
        .route("/room/{room_id}", get(project::list_by_room))
        .route("/{project_id}", get(project::get_by_id))
        .route("/{project_id}/status", patch(project::update_status))
        .route("/{project_id}/files", get(project_file::list))
        .route("/{project_id}/files/paste", post(project_file::paste))
        .route(
            "/{project_id}/files/upload",
            post(project_file::upload).layer(upload_limit),
        )
        .route("/{project_id}/files/{file_id}", put(project_file::update))
        .route("/{project_id}/compile", post(compilation::compile))
        .route("/{project_id}/preview", get(compilation::preview))
        .route("/{project_id}/{filename}", get(project_file::serve_raw))
}
