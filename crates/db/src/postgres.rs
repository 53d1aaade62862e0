//! PostgreSQL document store for the `projects` and `project_files` tables.
//!
//! Each row keeps the full record in a `doc` JSONB column; the scalar columns
//! beside it mirror the fields that queries filter or order on.

use async_trait::async_trait;
use collab_core::file::ProjectFile;
use collab_core::project::{Project, ProjectStatus};
use serde_json::Value;

use crate::store::{ProjectStore, StoreError};
use crate::DbPool;

pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn decode_all<T: serde::de::DeserializeOwned>(docs: Vec<Value>) -> Result<Vec<T>, StoreError> {
    docs.into_iter()
        .map(|doc| serde_json::from_value(doc).map_err(StoreError::from))
        .collect()
}

/// Replace a project document. Dropping an uncommitted transaction rolls
/// this back along with whatever else ran in it.
async fn update_project<'e, E>(executor: E, project: &Project) -> Result<u64, StoreError>
where
    E: sqlx::PgExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE projects SET
            room_id = $2,
            status = $3,
            updated_at = $4,
            doc = $5
         WHERE project_id = $1",
    )
    .bind(&project.project_id)
    .bind(&project.room_id)
    .bind(project.status.as_str())
    .bind(project.updated_at)
    .bind(serde_json::to_value(project)?)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

#[async_trait]
impl ProjectStore for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }

    async fn insert_project(&self, project: &Project) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO projects (project_id, room_id, created_by, status, updated_at, doc)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&project.project_id)
        .bind(&project.room_id)
        .bind(&project.created_by)
        .bind(project.status.as_str())
        .bind(project.updated_at)
        .bind(serde_json::to_value(project)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_project(&self, project_id: &str) -> Result<Option<Project>, StoreError> {
        let doc: Option<Value> =
            sqlx::query_scalar("SELECT doc FROM projects WHERE project_id = $1")
                .bind(project_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(doc.map(serde_json::from_value).transpose()?)
    }

    async fn list_projects_by_room(
        &self,
        room_id: &str,
        status: ProjectStatus,
    ) -> Result<Vec<Project>, StoreError> {
        let docs: Vec<Value> = sqlx::query_scalar(
            "SELECT doc FROM projects
             WHERE room_id = $1 AND status = $2
             ORDER BY updated_at DESC, project_id",
        )
        .bind(room_id)
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;
        decode_all(docs)
    }

    async fn save_project(&self, project: &Project) -> Result<bool, StoreError> {
        let rows = update_project(&self.pool, project).await?;
        Ok(rows > 0)
    }

    async fn insert_file(
        &self,
        project: &Project,
        file: &ProjectFile,
    ) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;
        if update_project(&mut *tx, project).await? == 0 {
            return Ok(false);
        }
        sqlx::query(
            "INSERT INTO project_files (file_id, project_id, file_name, updated_at, doc)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&file.file_id)
        .bind(&file.project_id)
        .bind(&file.file_name)
        .bind(file.updated_at)
        .bind(serde_json::to_value(file)?)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(true)
    }

    async fn find_file(
        &self,
        project_id: &str,
        file_id: &str,
    ) -> Result<Option<ProjectFile>, StoreError> {
        let doc: Option<Value> = sqlx::query_scalar(
            "SELECT doc FROM project_files WHERE project_id = $1 AND file_id = $2",
        )
        .bind(project_id)
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(doc.map(serde_json::from_value).transpose()?)
    }

    async fn save_file(&self, project: &Project, file: &ProjectFile) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;
        if update_project(&mut *tx, project).await? == 0 {
            return Ok(false);
        }
        let result = sqlx::query(
            "UPDATE project_files SET
                file_name = $2,
                updated_at = $3,
                doc = $4
             WHERE file_id = $1",
        )
        .bind(&file.file_id)
        .bind(&file.file_name)
        .bind(file.updated_at)
        .bind(serde_json::to_value(file)?)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(false);
        }
        tx.commit().await?;
        Ok(true)
    }

    async fn list_files(&self, project_id: &str) -> Result<Vec<ProjectFile>, StoreError> {
        let docs: Vec<Value> = sqlx::query_scalar(
            "SELECT doc FROM project_files WHERE project_id = $1 ORDER BY seq",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        decode_all(docs)
    }
}
