use async_trait::async_trait;
use buddy_core::model::{ProjectId, SavedProject};

use super::SqliteRepository;
use super::mapping::{conn, map_project_row, project_id_from_i64, project_id_to_i64};
use crate::repository::{NewProjectRecord, ProjectRepository, StorageError};

#[async_trait]
impl ProjectRepository for SqliteRepository {
    async fn insert_project(&self, project: NewProjectRecord) -> Result<ProjectId, StorageError> {
        if project.code.trim().is_empty() {
            return Err(StorageError::Serialization("project code cannot be empty".into()));
        }

        let res = sqlx::query(
            r"
            INSERT INTO projects (code, language, saved_at)
            VALUES (?1, ?2, ?3)
            ",
        )
        .bind(project.code)
        .bind(project.language.display_name())
        .bind(project.saved_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        project_id_from_i64(res.last_insert_rowid())
    }

    async fn get_project(&self, id: ProjectId) -> Result<Option<SavedProject>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, code, language, saved_at
            FROM projects WHERE id = ?1
            ",
        )
        .bind(project_id_to_i64(id)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_project_row).transpose()
    }

    async fn list_projects(&self, limit: u32) -> Result<Vec<SavedProject>, StorageError> {
        self.newest_projects(i64::from(limit)).await
    }

    async fn all_projects(&self) -> Result<Vec<SavedProject>, StorageError> {
        // SQLite treats a negative LIMIT as no limit.
        self.newest_projects(-1).await
    }

    async fn delete_project(&self, id: ProjectId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM projects WHERE id = ?1")
            .bind(project_id_to_i64(id)?)
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}

impl SqliteRepository {
    async fn newest_projects(&self, limit: i64) -> Result<Vec<SavedProject>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, code, language, saved_at
            FROM projects
            ORDER BY saved_at DESC, id DESC
            LIMIT ?1
            ",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_project_row).collect()
    }
}
