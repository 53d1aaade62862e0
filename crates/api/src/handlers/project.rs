//! Handlers for the `/projects` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use collab_core::error::CoreError;
use collab_core::project::{CreateProject, Project, ProjectStatus, ProjectWithFiles};
use serde::Deserialize;

use crate::error::AppResult;
use crate::extract::JsonBody;
use crate::response::{Envelope, ProjectData, ProjectsData};
use crate::state::AppState;

/// Query parameters for listing a room's projects (`?status=`).
#[derive(Debug, Deserialize)]
pub struct StatusParams {
    pub status: Option<String>,
}

/// Body of `PATCH /api/projects/{project_id}/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateStatus {
    pub status: Option<String>,
}

fn parse_status(raw: Option<&str>) -> Result<Option<ProjectStatus>, CoreError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<ProjectStatus>())
        .transpose()
}

/// POST /api/projects/create
pub async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateProject>,
) -> AppResult<(StatusCode, Json<Envelope<ProjectData<Project>>>)> {
    let project = state.registry.create_project(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(ProjectData { project }).with_message("Project created successfully")),
    ))
}

/// GET /api/projects/room/{room_id}?status=active
///
/// Most recently updated first. `status` defaults to `active`.
pub async fn list_by_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Query(params): Query<StatusParams>,
) -> AppResult<Json<Envelope<ProjectsData<Project>>>> {
    let status = parse_status(params.status.as_deref())?.unwrap_or_default();
    let projects = state
        .registry
        .list_projects_for_room(&room_id, status)
        .await?;
    Ok(Json(Envelope::ok(ProjectsData { projects })))
}

/// GET /api/projects/{project_id}
///
/// The project record joined with its files, files ordered by name.
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> AppResult<Json<Envelope<ProjectData<ProjectWithFiles>>>> {
    let project = state.registry.get_project_with_files(&project_id).await?;
    Ok(Json(Envelope::ok(ProjectData { project })))
}

/// PATCH /api/projects/{project_id}/status
pub async fn update_status(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    JsonBody(input): JsonBody<UpdateStatus>,
) -> AppResult<Json<Envelope<ProjectData<Project>>>> {
    let status = parse_status(input.status.as_deref())?
        .ok_or_else(|| CoreError::missing_fields(&["status"]))?;
    let project = state.registry.set_status(&project_id, status).await?;
    Ok(Json(
        Envelope::ok(ProjectData { project }).with_message(format!("Project is now {status}")),
    ))
}
