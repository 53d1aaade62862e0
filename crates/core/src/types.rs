use uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Identifiers are opaque strings on the wire (`proj_…`, `file_…`).
pub type ProjectId = String;
pub type FileId = String;

/// Generate a fresh project identifier.
pub fn new_project_id() -> ProjectId {
    format!("proj_{}", Uuid::new_v4().simple())
}

/// Generate a fresh file identifier.
pub fn new_file_id() -> FileId {
    format!("file_{}", Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_prefixed_and_distinct() {
        let a = new_project_id();
        let b = new_project_id();
        assert!(a.starts_with("proj_"));
        assert_ne!(a, b);
        assert!(new_file_id().starts_with("file_"));
    }
}
