//! Project records, embedded collaborators, and project creation rules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::compile::CompilationResult;
use crate::error::{missing_fields, CoreError};
use crate::file::ProjectFile;
use crate::types::{new_project_id, ProjectId, Timestamp};

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Lifecycle status of a project. Projects only ever move through this field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Active,
    Archived,
    Deleted,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Archived => "archived",
            ProjectStatus::Deleted => "deleted",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ProjectStatus::Active),
            "archived" => Ok(ProjectStatus::Archived),
            "deleted" => Ok(ProjectStatus::Deleted),
            other => Err(CoreError::Validation(format!(
                "Invalid status '{other}'. Valid statuses: active, archived, deleted"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollaboratorRole {
    Owner,
    Editor,
    Viewer,
}

impl CollaboratorRole {
    /// Owners and editors may write files; viewers may not.
    pub fn can_write(self) -> bool {
        matches!(self, CollaboratorRole::Owner | CollaboratorRole::Editor)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    #[default]
    Web,
    React,
    Node,
    Static,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompilationStatus {
    #[default]
    Idle,
    Success,
    Error,
}

// ---------------------------------------------------------------------------
// Embedded documents
// ---------------------------------------------------------------------------

/// A user with a role on one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collaborator {
    pub user_id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: CollaboratorRole,
    pub joined_at: Timestamp,
}

impl Collaborator {
    /// Whether `actor` (a username or user id) names this collaborator.
    pub fn is(&self, actor: &str) -> bool {
        self.username == actor || self.user_id == actor
    }
}

/// Editor settings. Unknown keys sent by clients are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectSettings {
    pub auto_save: bool,
    pub theme: String,
    pub entry_file: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            auto_save: true,
            theme: "dark".to_string(),
            entry_file: "index.html".to_string(),
            extra: Map::new(),
        }
    }
}

/// Outcome of the most recent compile, as stored on the project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilationState {
    pub status: CompilationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_compiled_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiled_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
}

impl CompilationState {
    /// Replace the stored state with the result of a compile.
    ///
    /// A failed compile clears the previous output, so a stale preview is
    /// never served after the HTML entry file disappears.
    pub fn record(&mut self, result: &CompilationResult) {
        self.status = if result.success {
            CompilationStatus::Success
        } else {
            CompilationStatus::Error
        };
        self.last_compiled_at = Some(result.compiled_at);
        self.compiled_by = Some(result.compiled_by.clone());
        self.output = result.output.clone();
        self.error = result.error.clone();
        self.preview_url = result.preview_url.clone();
    }
}

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub project_id: ProjectId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub room_id: String,
    pub created_by: String,
    #[serde(default)]
    pub project_type: ProjectType,
    pub collaborators: Vec<Collaborator>,
    #[serde(default)]
    pub settings: ProjectSettings,
    #[serde(default)]
    pub compilation: CompilationState,
    #[serde(default)]
    pub status: ProjectStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    /// Build a new project from a create request.
    ///
    /// The creator is seeded as `owner`; room members follow as `editor`s,
    /// skipping any username already present.
    pub fn create(input: CreateProject, now: Timestamp) -> Result<Self, CoreError> {
        let fields = [
            ("name", input.name.as_deref()),
            ("roomId", input.room_id.as_deref()),
            ("createdBy", input.created_by.as_deref()),
        ];
        let [Some(name), Some(room_id), Some(created_by)] = fields.map(|(_, v)| non_blank(v)) else {
            return Err(CoreError::missing_fields(&missing_fields(&fields)));
        };
        input
            .validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;

        let mut project = Project {
            project_id: new_project_id(),
            name,
            description: input.description.filter(|d| !d.trim().is_empty()),
            room_id,
            created_by: created_by.clone(),
            project_type: input.project_type.unwrap_or_default(),
            collaborators: Vec::new(),
            settings: ProjectSettings::default(),
            compilation: CompilationState::default(),
            status: ProjectStatus::Active,
            created_at: now,
            updated_at: now,
        };

        project.add_collaborator(Collaborator {
            user_id: created_by.clone(),
            username: created_by,
            email: None,
            role: CollaboratorRole::Owner,
            joined_at: now,
        });

        for member in input.room_members {
            let username = member.username.trim();
            if username.is_empty() {
                continue;
            }
            project.add_collaborator(Collaborator {
                user_id: member
                    .user_id
                    .filter(|id| !id.trim().is_empty())
                    .unwrap_or_else(|| username.to_string()),
                username: username.to_string(),
                email: member.email,
                role: CollaboratorRole::Editor,
                joined_at: now,
            });
        }

        Ok(project)
    }

    /// Find the collaborator entry for `actor` (username or user id).
    pub fn collaborator(&self, actor: &str) -> Option<&Collaborator> {
        self.collaborators.iter().find(|c| c.is(actor))
    }

    /// Append a collaborator unless the username is already present.
    ///
    /// Returns `true` if the collaborator was added.
    pub fn add_collaborator(&mut self, collaborator: Collaborator) -> bool {
        if self
            .collaborators
            .iter()
            .any(|c| c.username == collaborator.username)
        {
            return false;
        }
        self.collaborators.push(collaborator);
        true
    }
}

/// Trimmed copy of a required string field, `None` when absent or blank.
pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// A project joined with its files, files ordered by name.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectWithFiles {
    #[serde(flatten)]
    pub project: Project,
    pub files: Vec<ProjectFile>,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// A room member supplied at creation time.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomMember {
    #[serde(default)]
    pub user_id: Option<String>,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Body of `POST /api/projects/create`.
///
/// Required fields are optional here so that every missing one can be
/// reported together instead of failing on the first during deserialization.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProject {
    #[validate(length(max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(max = 128))]
    pub room_id: Option<String>,
    #[validate(length(max = 128))]
    pub created_by: Option<String>,
    pub project_type: Option<ProjectType>,
    #[serde(default)]
    pub room_members: Vec<RoomMember>,
}
