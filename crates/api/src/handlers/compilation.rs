//! Compile and preview handlers.

use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use collab_core::compile::CompilationResult;
use collab_core::error::CoreError;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::JsonBody;
use crate::response::{CompilationData, Envelope};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileRequest {
    pub compiled_by: Option<String>,
}

/// POST /api/projects/{project_id}/compile
///
/// A compile that fails for lack of an HTML file is still a 200: the body
/// carries `success: false` and the failed compilation.
pub async fn compile(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    JsonBody(input): JsonBody<CompileRequest>,
) -> AppResult<Json<Envelope<CompilationData<CompilationResult>>>> {
    let compiled_by = input
        .compiled_by
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CoreError::missing_fields(&["compiledBy"]))?
        .to_string();

    let compilation = state
        .registry
        .compile_project(&project_id, &compiled_by)
        .await?;

    let envelope = if compilation.success {
        Envelope::ok(CompilationData { compilation })
            .with_message("Project compiled successfully")
    } else {
        let message = compilation
            .error
            .clone()
            .unwrap_or_else(|| "Compilation failed".to_string());
        Envelope::failure(CompilationData { compilation }, message)
    };
    Ok(Json(envelope))
}

/// GET /api/projects/{project_id}/preview
///
/// The last successfully compiled document as `text/html`. Errors are plain
/// text: 404 for an unknown project, 400 when nothing has compiled yet.
pub async fn preview(State(state): State<AppState>, Path(project_id): Path<String>) -> Response {
    match state.registry.preview_document(&project_id).await {
        Ok(document) => Html(document).into_response(),
        Err(err) => AppError::from(err).into_text_response(),
    }
}
