//! The project/file registry: the working set every handler goes through.
//!
//! Reads go straight to the store. Every read-modify-write sequence (a
//! membership enrollment followed by a file write, a compile recording its
//! result) holds `write_lock` for its whole duration, so two writers on the
//! same registry never interleave. A file and the project document it
//! touches are handed to the store in a single call.

use std::sync::Arc;

use chrono::Utc;
use collab_core::compile::{self, CompilationResult};
use collab_core::error::CoreError;
use collab_core::file::{FileDescriptor, FileMetadata, FileUpdate, ProjectFile};
use collab_core::membership::MembershipPolicy;
use collab_core::project::{
    CompilationStatus, CreateProject, Project, ProjectStatus, ProjectWithFiles,
};
use collab_core::types::{new_file_id, Timestamp};
use tokio::sync::Mutex;

use crate::memory::MemoryStore;
use crate::store::{ProjectStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type RegistryResult<T> = Result<T, RegistryError>;

pub struct ProjectRegistry {
    store: Arc<dyn ProjectStore>,
    membership: MembershipPolicy,
    write_lock: Mutex<()>,
}

fn project_not_found(project_id: &str) -> RegistryError {
    CoreError::NotFound {
        entity: "Project",
        id: project_id.to_string(),
    }
    .into()
}

fn file_not_found(file_id: &str) -> RegistryError {
    CoreError::NotFound {
        entity: "ProjectFile",
        id: file_id.to_string(),
    }
    .into()
}

impl ProjectRegistry {
    pub fn new(store: Arc<dyn ProjectStore>, membership: MembershipPolicy) -> Self {
        Self {
            store,
            membership,
            write_lock: Mutex::new(()),
        }
    }

    /// A registry over a fresh [`MemoryStore`] with the default membership policy.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), MembershipPolicy::default())
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    pub async fn health_check(&self) -> RegistryResult<()> {
        Ok(self.store.health_check().await?)
    }

    // -----------------------------------------------------------------------
    // Projects
    // -----------------------------------------------------------------------

    pub async fn create_project(&self, input: CreateProject) -> RegistryResult<Project> {
        let project = Project::create(input, Utc::now())?;
        self.store.insert_project(&project).await?;
        tracing::info!(
            project_id = %project.project_id,
            room_id = %project.room_id,
            collaborators = project.collaborators.len(),
            "Project created"
        );
        Ok(project)
    }

    pub async fn list_projects_for_room(
        &self,
        room_id: &str,
        status: ProjectStatus,
    ) -> RegistryResult<Vec<Project>> {
        Ok(self.store.list_projects_by_room(room_id, status).await?)
    }

    pub async fn get_project(&self, project_id: &str) -> RegistryResult<Project> {
        self.store
            .find_project(project_id)
            .await?
            .ok_or_else(|| project_not_found(project_id))
    }

    pub async fn get_project_with_files(
        &self,
        project_id: &str,
    ) -> RegistryResult<ProjectWithFiles> {
        let project = self.get_project(project_id).await?;
        let files = self.sorted_files(project_id).await?;
        Ok(ProjectWithFiles { project, files })
    }

    /// Move a project to a new lifecycle status.
    pub async fn set_status(
        &self,
        project_id: &str,
        status: ProjectStatus,
    ) -> RegistryResult<Project> {
        let _guard = self.write_lock.lock().await;
        let mut project = self.get_project(project_id).await?;
        if project.status != status {
            project.status = status;
            project.updated_at = Utc::now();
            self.save_project(&project).await?;
            tracing::info!(project_id, status = %status, "Project status changed");
        }
        Ok(project)
    }

    // -----------------------------------------------------------------------
    // Files
    // -----------------------------------------------------------------------

    /// Files of a project ordered by file name.
    pub async fn list_files(&self, project_id: &str) -> RegistryResult<Vec<ProjectFile>> {
        self.get_project(project_id).await?;
        self.sorted_files(project_id).await
    }

    /// Add a new file to a project.
    ///
    /// Every paste or upload creates its own record, even when another file
    /// already has the same path; content is only ever replaced by
    /// [`update_file`](Self::update_file). The writer must pass the membership
    /// check first, and any enrollment it returns is stored with the file.
    pub async fn add_file(
        &self,
        project_id: &str,
        descriptor: FileDescriptor,
    ) -> RegistryResult<ProjectFile> {
        let _guard = self.write_lock.lock().await;
        let now = Utc::now();
        let mut project = self.get_project(project_id).await?;
        self.authorize_write(&mut project, descriptor.actor(), now)?;

        let file = ProjectFile {
            file_id: new_file_id(),
            project_id: project_id.to_string(),
            metadata: FileMetadata::describe(
                &descriptor.content,
                descriptor.file_type,
                descriptor.metadata,
            ),
            file_name: descriptor.file_name,
            file_path: descriptor.file_path,
            file_type: descriptor.file_type,
            content: descriptor.content,
            uploaded_by: descriptor.uploaded_by,
            last_modified_by: descriptor.last_modified_by,
            created_at: now,
            updated_at: now,
        };
        project.updated_at = now;
        if !self.store.insert_file(&project, &file).await? {
            return Err(project_not_found(project_id));
        }

        tracing::info!(
            project_id,
            file_id = %file.file_id,
            file_name = %file.file_name,
            size = file.metadata.size,
            "File added"
        );
        Ok(file)
    }

    /// Replace the content of an existing file by id.
    ///
    /// An unknown `file_id` fails with `NotFound` and leaves the file set untouched.
    pub async fn update_file(
        &self,
        project_id: &str,
        file_id: &str,
        update: FileUpdate,
    ) -> RegistryResult<ProjectFile> {
        let _guard = self.write_lock.lock().await;
        let now = Utc::now();
        let mut project = self.get_project(project_id).await?;
        let mut file = self
            .store
            .find_file(project_id, file_id)
            .await?
            .ok_or_else(|| file_not_found(file_id))?;

        self.authorize_write(&mut project, &update.last_modified_by, now)?;

        file.replace_content(update.content, update.last_modified_by, now);
        project.updated_at = now;
        if !self.store.save_file(&project, &file).await? {
            return Err(file_not_found(file_id));
        }

        tracing::info!(project_id, file_id, size = file.metadata.size, "File updated");
        Ok(file)
    }

    /// Look a file up by its name (or path) for raw serving.
    pub async fn find_file_by_name(
        &self,
        project_id: &str,
        file_name: &str,
    ) -> RegistryResult<ProjectFile> {
        self.get_project(project_id).await?;
        // Paths may repeat; the most recently added file wins.
        self.store
            .list_files(project_id)
            .await?
            .into_iter()
            .rev()
            .find(|f| f.file_name == file_name || f.file_path == file_name)
            .ok_or_else(|| {
                CoreError::NotFound {
                    entity: "ProjectFile",
                    id: file_name.to_string(),
                }
                .into()
            })
    }

    // -----------------------------------------------------------------------
    // Compilation
    // -----------------------------------------------------------------------

    /// Compile the project's files and record the outcome on the project.
    ///
    /// A missing HTML file yields `success: false`, not an error.
    pub async fn compile_project(
        &self,
        project_id: &str,
        compiled_by: &str,
    ) -> RegistryResult<CompilationResult> {
        let _guard = self.write_lock.lock().await;
        let now = Utc::now();
        let mut project = self.get_project(project_id).await?;
        let files = self.store.list_files(project_id).await?;

        let result = CompilationResult::from_outcome(
            compile::compile_project(&project, &files),
            compiled_by,
            now,
        );

        project.compilation.record(&result);
        project.updated_at = now;
        self.save_project(&project).await?;

        if result.success {
            tracing::info!(project_id, compiled_by, files = files.len(), "Project compiled");
        } else {
            tracing::warn!(
                project_id,
                compiled_by,
                error = result.error.as_deref().unwrap_or_default(),
                "Project compilation failed"
            );
        }
        Ok(result)
    }

    /// The document produced by the last successful compile.
    pub async fn preview_document(&self, project_id: &str) -> RegistryResult<String> {
        let project = self.get_project(project_id).await?;
        match (project.compilation.status, project.compilation.output) {
            (CompilationStatus::Success, Some(output)) => Ok(output),
            _ => Err(CoreError::Validation(
                "Project has not been compiled successfully. Compile it before previewing.".into(),
            )
            .into()),
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    async fn sorted_files(&self, project_id: &str) -> RegistryResult<Vec<ProjectFile>> {
        let mut files = self.store.list_files(project_id).await?;
        files.sort_by(|a, b| {
            a.file_name
                .cmp(&b.file_name)
                .then_with(|| a.file_path.cmp(&b.file_path))
        });
        Ok(files)
    }

    /// Apply the membership decision for `actor`, adding them to `project`
    /// in memory when the policy enrolls them. The caller saves the project.
    fn authorize_write(
        &self,
        project: &mut Project,
        actor: &str,
        now: Timestamp,
    ) -> RegistryResult<()> {
        let decision = self.membership.evaluate(project, actor, now);
        if let Some(collaborator) = decision.into_enrollment()? {
            tracing::info!(
                project_id = %project.project_id,
                user = %collaborator.username,
                "Auto-enrolled file writer as editor"
            );
            project.add_collaborator(collaborator);
        }
        Ok(())
    }

    async fn save_project(&self, project: &Project) -> RegistryResult<()> {
        if self.store.save_project(project).await? {
            Ok(())
        } else {
            Err(project_not_found(&project.project_id))
        }
    }
}
