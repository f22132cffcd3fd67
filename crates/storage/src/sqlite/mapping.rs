use buddy_core::model::{Language, ProjectId, SavedProject};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn project_id_from_i64(v: i64) -> Result<ProjectId, StorageError> {
    u64::try_from(v)
        .map(ProjectId::new)
        .map_err(|_| StorageError::Serialization("project_id sign overflow".into()))
}

pub(crate) fn project_id_to_i64(id: ProjectId) -> Result<i64, StorageError> {
    i64::try_from(id.value()).map_err(|_| StorageError::Serialization("project_id overflow".into()))
}

pub(crate) fn parse_language(s: &str) -> Result<Language, StorageError> {
    s.parse::<Language>().map_err(ser)
}

pub(crate) fn map_project_row(row: &sqlx::sqlite::SqliteRow) -> Result<SavedProject, StorageError> {
    let id = project_id_from_i64(row.try_get("id").map_err(ser)?)?;
    let code: String = row.try_get("code").map_err(ser)?;
    let language_str: String = row.try_get("language").map_err(ser)?;
    let language = parse_language(&language_str)?;
    let saved_at: chrono::DateTime<chrono::Utc> = row.try_get("saved_at").map_err(ser)?;

    SavedProject::new(id, code, language, saved_at).map_err(ser)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn languages_round_trip_through_display_names() {
        for language in Language::ALL {
            assert_eq!(parse_language(language.display_name()).unwrap(), language);
        }
        assert!(parse_language("Brainfuck").is_err());
    }

    #[test]
    fn negative_ids_are_rejected() {
        assert!(project_id_from_i64(-1).is_err());
        assert_eq!(project_id_to_i64(ProjectId::new(7)).unwrap(), 7);
    }
}
