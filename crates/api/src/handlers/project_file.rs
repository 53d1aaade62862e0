//! Handlers for project files.
//!
//! Files are nested under projects: `/projects/{project_id}/files[/{file_id}]`,
//! plus raw serving at `/projects/{project_id}/{filename}`.

use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use collab_core::file::{
    FileDescriptor, FileUpdate, PasteFile, ProjectFile, UpdateFile, UploadedFile,
};
use collab_core::file_types;

use crate::error::{AppError, AppResult};
use crate::extract::JsonBody;
use crate::response::{Envelope, FileData, FilesData};
use crate::state::AppState;

type FileResponse = (StatusCode, Json<Envelope<FileData<ProjectFile>>>);

/// GET /api/projects/{project_id}/files
pub async fn list(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> AppResult<Json<Envelope<FilesData<ProjectFile>>>> {
    let files = state.registry.list_files(&project_id).await?;
    Ok(Json(Envelope::ok(FilesData { files })))
}

/// POST /api/projects/{project_id}/files/paste
///
/// Always adds a new file; content is replaced through `PUT .../files/{file_id}`.
pub async fn paste(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    JsonBody(input): JsonBody<PasteFile>,
) -> AppResult<FileResponse> {
    let descriptor = FileDescriptor::from_paste(input)?;
    write(&state, &project_id, descriptor).await
}

/// POST /api/projects/{project_id}/files/upload
///
/// Accepts a multipart form with a `file` part and `uploadedBy` / optional
/// `filePath` text fields. The extension must be on the upload allow-list.
pub async fn upload(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    mut multipart: Multipart,
) -> AppResult<FileResponse> {
    let mut upload: Option<UploadedFile> = None;
    let mut uploaded_by: Option<String> = None;
    let mut file_path: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                upload = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            "uploadedBy" | "filePath" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                if name == "uploadedBy" {
                    uploaded_by = Some(text);
                } else {
                    file_path = Some(text);
                }
            }
            _ => {} // ignore unknown fields
        }
    }

    let upload =
        upload.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;
    let descriptor = FileDescriptor::from_upload(
        upload,
        uploaded_by.as_deref(),
        file_path.as_deref(),
        state.config.max_upload_bytes,
    )?;
    write(&state, &project_id, descriptor).await
}

/// PUT /api/projects/{project_id}/files/{file_id}
pub async fn update(
    State(state): State<AppState>,
    Path((project_id, file_id)): Path<(String, String)>,
    JsonBody(input): JsonBody<UpdateFile>,
) -> AppResult<Json<Envelope<FileData<ProjectFile>>>> {
    let update = FileUpdate::from_request(input)?;
    let file = state
        .registry
        .update_file(&project_id, &file_id, update)
        .await?;
    Ok(Json(
        Envelope::ok(FileData { file }).with_message("File updated successfully"),
    ))
}

/// GET /api/projects/{project_id}/{filename}
///
/// Serves the stored content raw with a content type derived from the
/// extension. Errors are plain text.
pub async fn serve_raw(
    State(state): State<AppState>,
    Path((project_id, file_name)): Path<(String, String)>,
) -> Response {
    match state
        .registry
        .find_file_by_name(&project_id, &file_name)
        .await
    {
        Ok(file) => (
            [(header::CONTENT_TYPE, file_types::content_type_for(&file.file_name))],
            file.content,
        )
            .into_response(),
        Err(err) => AppError::from(err).into_text_response(),
    }
}

async fn write(
    state: &AppState,
    project_id: &str,
    descriptor: FileDescriptor,
) -> AppResult<FileResponse> {
    let file = state.registry.add_file(project_id, descriptor).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(FileData { file }).with_message("File saved successfully")),
    ))
}
