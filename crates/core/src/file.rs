//! Project file records and the write requests that produce them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{missing_fields, CoreError};
use crate::file_types::{self, FileType};
use crate::project::non_blank;
use crate::types::{FileId, ProjectId, Timestamp};

/// A file stored in a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFile {
    pub file_id: FileId,
    pub project_id: ProjectId,
    pub file_name: String,
    pub file_path: String,
    pub file_type: FileType,
    pub content: String,
    pub uploaded_by: String,
    pub last_modified_by: String,
    pub metadata: FileMetadata,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Derived file metadata plus any extra keys the client attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    /// Content length in bytes.
    pub size: usize,
    pub encoding: String,
    pub language: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FileMetadata {
    pub fn describe(content: &str, file_type: FileType, extra: Map<String, Value>) -> Self {
        Self {
            size: content.len(),
            encoding: "utf-8".to_string(),
            language: file_type.language().to_string(),
            extra,
        }
    }
}

impl ProjectFile {
    /// Replace the content in place, refreshing size and `updated_at`.
    pub fn replace_content(&mut self, content: String, modified_by: String, now: Timestamp) {
        self.metadata.size = content.len();
        self.content = content;
        self.last_modified_by = modified_by;
        self.updated_at = now;
    }
}

/// A validated file write, independent of whether it arrived as JSON or multipart.
#[derive(Debug, Clone, PartialEq)]
pub struct FileDescriptor {
    pub file_name: String,
    pub file_path: String,
    pub file_type: FileType,
    pub content: String,
    pub uploaded_by: String,
    pub last_modified_by: String,
    pub metadata: Map<String, Value>,
}

impl FileDescriptor {
    /// The user performing the write, used for the membership decision.
    pub fn actor(&self) -> &str {
        &self.uploaded_by
    }

    /// Validate a paste request body.
    pub fn from_paste(input: PasteFile) -> Result<Self, CoreError> {
        let fields = [
            ("fileName", input.file_name.as_deref()),
            ("fileType", input.file_type.as_deref()),
            ("uploadedBy", input.uploaded_by.as_deref()),
        ];
        let mut missing = missing_fields(&fields);
        // Empty content is a valid file; only an absent field is missing.
        if input.content.is_none() {
            missing.push("content");
        }
        let ([Some(file_name), Some(file_type), Some(uploaded_by)], Some(content)) =
            (fields.map(|(_, v)| non_blank(v)), input.content)
        else {
            return Err(CoreError::missing_fields(&missing));
        };

        let file_type: FileType = file_type.parse()?;
        let last_modified_by =
            non_blank(input.last_modified_by.as_deref()).unwrap_or_else(|| uploaded_by.clone());
        let file_path = non_blank(input.file_path.as_deref()).unwrap_or_else(|| file_name.clone());

        Ok(Self {
            file_name,
            file_path,
            file_type,
            content,
            uploaded_by,
            last_modified_by,
            metadata: input.metadata.unwrap_or_default(),
        })
    }

    /// Validate a multipart upload.
    ///
    /// The extension must be on the upload allow-list, the payload must fit
    /// within `max_bytes`, and the bytes must be UTF-8 text.
    pub fn from_upload(
        upload: UploadedFile,
        uploaded_by: Option<&str>,
        file_path: Option<&str>,
        max_bytes: usize,
    ) -> Result<Self, CoreError> {
        let Some(uploaded_by) = non_blank(uploaded_by) else {
            return Err(CoreError::missing_fields(&["uploadedBy"]));
        };
        let file_name = upload.file_name.trim().to_string();
        if file_name.is_empty() {
            return Err(CoreError::missing_fields(&["file"]));
        }
        file_types::validate_upload_extension(&file_name)?;
        if upload.bytes.len() > max_bytes {
            return Err(CoreError::Validation(format!(
                "File exceeds the maximum upload size of {max_bytes} bytes"
            )));
        }
        let content = String::from_utf8(upload.bytes)
            .map_err(|_| CoreError::Validation("File content must be UTF-8 text".into()))?;

        let mut metadata = Map::new();
        if let Some(mime) = upload.content_type {
            metadata.insert("mimeType".into(), Value::String(mime));
        }

        Ok(Self {
            file_type: FileType::from_file_name(&file_name),
            file_path: non_blank(file_path).unwrap_or_else(|| file_name.clone()),
            file_name,
            content,
            last_modified_by: uploaded_by.clone(),
            uploaded_by,
            metadata,
        })
    }
}

/// Body of `POST /api/projects/{id}/files/paste`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasteFile {
    pub file_name: Option<String>,
    pub file_path: Option<String>,
    pub file_type: Option<String>,
    pub content: Option<String>,
    pub uploaded_by: Option<String>,
    pub last_modified_by: Option<String>,
    pub metadata: Option<Map<String, Value>>,
}

/// The `file` part of a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Body of `PUT /api/projects/{id}/files/{file_id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFile {
    pub content: Option<String>,
    pub last_modified_by: Option<String>,
}

/// A validated content replacement.
#[derive(Debug, Clone, PartialEq)]
pub struct FileUpdate {
    pub content: String,
    pub last_modified_by: String,
}

impl FileUpdate {
    pub fn from_request(input: UpdateFile) -> Result<Self, CoreError> {
        let last_modified_by = non_blank(input.last_modified_by.as_deref());
        match (input.content, last_modified_by) {
            (Some(content), Some(last_modified_by)) => Ok(Self {
                content,
                last_modified_by,
            }),
            (content, modifier) => {
                let mut missing = Vec::new();
                if content.is_none() {
                    missing.push("content");
                }
                if modifier.is_none() {
                    missing.push("lastModifiedBy");
                }
                Err(CoreError::missing_fields(&missing))
            }
        }
    }
}
