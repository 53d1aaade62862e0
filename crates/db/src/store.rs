use async_trait::async_trait;
use collab_core::file::ProjectFile;
use collab_core::project::{Project, ProjectStatus};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Document encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Persistence for project and file documents.
///
/// Stores do plain reads and whole-document writes. A file write also
/// replaces the owning project document (its `updated_at` and any
/// collaborator enrolled by the write), and both land together or not at all.
///
/// Ordering guarantees: `list_projects_by_room` returns most recently updated
/// first, and `list_files` returns files in insertion order.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Short backend name reported by the health endpoint.
    fn backend(&self) -> &'static str;

    async fn health_check(&self) -> Result<(), StoreError>;

    async fn insert_project(&self, project: &Project) -> Result<(), StoreError>;

    async fn find_project(&self, project_id: &str) -> Result<Option<Project>, StoreError>;

    async fn list_projects_by_room(
        &self,
        room_id: &str,
        status: ProjectStatus,
    ) -> Result<Vec<Project>, StoreError>;

    /// Replace a project document. Returns `false` if it does not exist.
    async fn save_project(&self, project: &Project) -> Result<bool, StoreError>;

    /// Insert a file and replace its project document in one write.
    /// Returns `false`, writing nothing, if the project does not exist.
    async fn insert_file(&self, project: &Project, file: &ProjectFile)
        -> Result<bool, StoreError>;

    async fn find_file(
        &self,
        project_id: &str,
        file_id: &str,
    ) -> Result<Option<ProjectFile>, StoreError>;

    /// Replace a file document and its project document in one write.
    /// Returns `false`, writing nothing, if either does not exist.
    async fn save_file(&self, project: &Project, file: &ProjectFile) -> Result<bool, StoreError>;

    async fn list_files(&self, project_id: &str) -> Result<Vec<ProjectFile>, StoreError>;
}
