//! Shared response envelope types for API handlers.
//!
//! Every JSON response is `{ "success": bool, "message"?: string, <key>: ... }`
//! where `<key>` names the payload (`project`, `projects`, `file`, ...).
//! Errors use the same shape via [`crate::error::AppError`].

use serde::Serialize;

/// Standard `{ success, message?, ...payload }` envelope.
///
/// The payload struct is flattened into the envelope, so its field name
/// becomes the response key.
///
/// # Example
///
/// ```ignore
/// Ok(Json(Envelope::ok(ProjectData { project })))
/// ```
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub payload: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(payload: T) -> Self {
        Self {
            success: true,
            message: None,
            payload,
        }
    }

    /// An unsuccessful response that still carries a payload.
    pub fn failure(payload: T, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            payload,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectData<T: Serialize> {
    pub project: T,
}

#[derive(Debug, Serialize)]
pub struct ProjectsData<T: Serialize> {
    pub projects: Vec<T>,
}

#[derive(Debug, Serialize)]
pub struct FileData<T: Serialize> {
    pub file: T,
}

#[derive(Debug, Serialize)]
pub struct FilesData<T: Serialize> {
    pub files: Vec<T>,
}

#[derive(Debug, Serialize)]
pub struct CompilationData<T: Serialize> {
    pub compilation: T,
}
