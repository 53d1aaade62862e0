//! File type classification for project files.
//!
//! Maps file extensions to the [`FileType`] stored on each file, the upload
//! allow-list, and the `Content-Type` used when a file is served raw.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Default upload ceiling: 5 MiB.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Extensions accepted by the multipart upload endpoint.
pub const ALLOWED_UPLOAD_EXTENSIONS: &[&str] =
    &["js", "jsx", "ts", "tsx", "css", "html", "json", "md", "txt"];

/// The kind of content a project file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Html,
    Css,
    Javascript,
    Jsx,
    Typescript,
    Tsx,
    Json,
    Markdown,
    Text,
}

impl FileType {
    pub fn as_str(self) -> &'static str {
        match self {
            FileType::Html => "html",
            FileType::Css => "css",
            FileType::Javascript => "javascript",
            FileType::Jsx => "jsx",
            FileType::Typescript => "typescript",
            FileType::Tsx => "tsx",
            FileType::Json => "json",
            FileType::Markdown => "markdown",
            FileType::Text => "text",
        }
    }

    /// Classify a file by its extension. Unknown extensions are plain text.
    pub fn from_file_name(file_name: &str) -> Self {
        match extension(file_name).as_deref() {
            Some("html") | Some("htm") => FileType::Html,
            Some("css") => FileType::Css,
            Some("js") | Some("mjs") => FileType::Javascript,
            Some("jsx") => FileType::Jsx,
            Some("ts") => FileType::Typescript,
            Some("tsx") => FileType::Tsx,
            Some("json") => FileType::Json,
            Some("md") => FileType::Markdown,
            _ => FileType::Text,
        }
    }

    /// Whether the compiler inlines this file into the preview `<script>` block.
    pub fn is_script(self) -> bool {
        matches!(self, FileType::Javascript | FileType::Jsx)
    }

    /// Editor language hint stored in file metadata.
    pub fn language(self) -> &'static str {
        match self {
            FileType::Html => "html",
            FileType::Css => "css",
            FileType::Javascript | FileType::Jsx => "javascript",
            FileType::Typescript | FileType::Tsx => "typescript",
            FileType::Json => "json",
            FileType::Markdown => "markdown",
            FileType::Text => "plaintext",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = CoreError;

    /// Accepts both the canonical names and the common short forms
    /// (`js`, `ts`, `md`, `txt`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(FileType::Html),
            "css" => Ok(FileType::Css),
            "javascript" | "js" => Ok(FileType::Javascript),
            "jsx" => Ok(FileType::Jsx),
            "typescript" | "ts" => Ok(FileType::Typescript),
            "tsx" => Ok(FileType::Tsx),
            "json" => Ok(FileType::Json),
            "markdown" | "md" => Ok(FileType::Markdown),
            "text" | "txt" => Ok(FileType::Text),
            other => Err(CoreError::UnsupportedFileType(format!(
                "Unknown file type '{other}'"
            ))),
        }
    }
}

/// Lowercased extension of `file_name`, without the dot.
pub fn extension(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Reject uploads whose extension is not on the allow-list.
pub fn validate_upload_extension(file_name: &str) -> Result<(), CoreError> {
    match extension(file_name) {
        Some(ext) if ALLOWED_UPLOAD_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        Some(ext) => Err(CoreError::UnsupportedFileType(format!(
            "Files with extension '.{ext}' are not allowed. Allowed: {}",
            allowed_extensions_list()
        ))),
        None => Err(CoreError::UnsupportedFileType(format!(
            "File '{file_name}' has no extension. Allowed: {}",
            allowed_extensions_list()
        ))),
    }
}

/// `Content-Type` for serving a stored file raw.
pub fn content_type_for(file_name: &str) -> &'static str {
    match extension(file_name).as_deref() {
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("html") => "text/html",
        Some("json") => "application/json",
        _ => "text/plain",
    }
}

fn allowed_extensions_list() -> String {
    ALLOWED_UPLOAD_EXTENSIONS
        .iter()
        .map(|e| format!(".{e}"))
        .collect::<Vec<_>>()
        .join(", ")
}
