#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Compilation failed: {0}")]
    Compilation(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Build the validation error reported when required request fields are absent.
    pub fn missing_fields(fields: &[&str]) -> Self {
        CoreError::Validation(format!("Missing required fields: {}", fields.join(", ")))
    }
}

/// Collect the names of required string fields that are absent or blank.
pub fn missing_fields<'a>(fields: &[(&'a str, Option<&str>)]) -> Vec<&'a str> {
    fields
        .iter()
        .filter(|(_, value)| value.map(|v| v.trim().is_empty()).unwrap_or(true))
        .map(|(name, _)| *name)
        .collect()
}
