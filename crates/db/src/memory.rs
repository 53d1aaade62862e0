//! In-process store. Contents live as long as the process does.

use std::collections::HashMap;

use async_trait::async_trait;
use collab_core::file::ProjectFile;
use collab_core::project::{Project, ProjectStatus};
use tokio::sync::RwLock;

use crate::store::{ProjectStore, StoreError};

#[derive(Default)]
struct Inner {
    projects: HashMap<String, Project>,
    /// Insertion order is the registry order used by the compiler.
    files: Vec<ProjectFile>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert_project(&self, project: &Project) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner
            .projects
            .insert(project.project_id.clone(), project.clone());
        Ok(())
    }

    async fn find_project(&self, project_id: &str) -> Result<Option<Project>, StoreError> {
        Ok(self.inner.read().await.projects.get(project_id).cloned())
    }

    async fn list_projects_by_room(
        &self,
        room_id: &str,
        status: ProjectStatus,
    ) -> Result<Vec<Project>, StoreError> {
        let inner = self.inner.read().await;
        let mut projects: Vec<Project> = inner
            .projects
            .values()
            .filter(|p| p.room_id == room_id && p.status == status)
            .cloned()
            .collect();
        projects.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.project_id.cmp(&b.project_id))
        });
        Ok(projects)
    }

    async fn save_project(&self, project: &Project) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        match inner.projects.get_mut(&project.project_id) {
            Some(existing) => {
                *existing = project.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_file(
        &self,
        project: &Project,
        file: &ProjectFile,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(existing) = inner.projects.get_mut(&project.project_id) else {
            return Ok(false);
        };
        *existing = project.clone();
        inner.files.push(file.clone());
        Ok(true)
    }

    async fn find_file(
        &self,
        project_id: &str,
        file_id: &str,
    ) -> Result<Option<ProjectFile>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .files
            .iter()
            .find(|f| f.project_id == project_id && f.file_id == file_id)
            .cloned())
    }

    async fn save_file(&self, project: &Project, file: &ProjectFile) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let Inner { projects, files } = &mut *inner;
        match (
            projects.get_mut(&project.project_id),
            files.iter_mut().find(|f| f.file_id == file.file_id),
        ) {
            (Some(existing_project), Some(existing_file)) => {
                *existing_project = project.clone();
                *existing_file = file.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_files(&self, project_id: &str) -> Result<Vec<ProjectFile>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .files
            .iter()
            .filter(|f| f.project_id == project_id)
            .cloned()
            .collect())
    }
}
