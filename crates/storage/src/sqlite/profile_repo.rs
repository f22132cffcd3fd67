use async_trait::async_trait;
use buddy_core::model::UserProfile;
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, ser};
use crate::repository::{ProfileRepository, StorageError};

#[async_trait]
impl ProfileRepository for SqliteRepository {
    async fn get_profile(&self) -> Result<Option<UserProfile>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT display_name, avatar_url
            FROM profile
            WHERE id = 1
            ",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let display_name: String = row.try_get("display_name").map_err(ser)?;
        let avatar_url: Option<String> = row.try_get("avatar_url").map_err(ser)?;

        UserProfile::new(display_name, avatar_url)
            .map(Some)
            .map_err(ser)
    }

    async fn save_profile(&self, profile: &UserProfile) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO profile (id, display_name, avatar_url)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                display_name = excluded.display_name,
                avatar_url = excluded.avatar_url
            ",
        )
        .bind(1_i64)
        .bind(profile.display_name())
        .bind(profile.avatar_url())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }
}
