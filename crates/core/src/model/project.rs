use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{Language, ProjectId};

/// Lines shown in a library card before truncating.
const PREVIEW_LINES: usize = 3;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProjectError {
    #[error("project code cannot be empty")]
    EmptyCode,
}

/// A code snippet saved to the user's library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedProject {
    id: ProjectId,
    code: String,
    language: Language,
    saved_at: DateTime<Utc>,
}

impl SavedProject {
    /// Create a project record.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::EmptyCode` when the code is blank.
    pub fn new(
        id: ProjectId,
        code: impl Into<String>,
        language: Language,
        saved_at: DateTime<Utc>,
    ) -> Result<Self, ProjectError> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(ProjectError::EmptyCode);
        }
        Ok(Self {
            id,
            code,
            language,
            saved_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> ProjectId {
        self.id
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }

    #[must_use]
    pub fn saved_at(&self) -> DateTime<Utc> {
        self.saved_at
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.code.split('\n').count()
    }

    /// First few lines of code, with `...` appended when truncated.
    #[must_use]
    pub fn preview(&self) -> String {
        let mut preview = self
            .code
            .split('\n')
            .take(PREVIEW_LINES)
            .collect::<Vec<_>>()
            .join("\n");
        if self.line_count() > PREVIEW_LINES {
            preview.push_str("...");
        }
        preview
    }

    /// Case-insensitive match on code or language name.
    #[must_use]
    pub fn matches(&self, term: &str) -> bool {
        let needle = term.to_lowercase();
        self.code.to_lowercase().contains(&needle)
            || self.language.display_name().to_lowercase().contains(&needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn preview_truncates_after_three_lines() {
        let project = SavedProject::new(
            ProjectId::new(1),
            "a\nb\nc\nd",
            Language::Python,
            fixed_now(),
        )
        .unwrap();
        assert_eq!(project.preview(), "a\nb\nc...");
        assert_eq!(project.line_count(), 4);

        let short =
            SavedProject::new(ProjectId::new(2), "a\nb", Language::Go, fixed_now()).unwrap();
        assert_eq!(short.preview(), "a\nb");
    }

    #[test]
    fn search_matches_code_or_language() {
        let project = SavedProject::new(
            ProjectId::new(1),
            "fn main() {}",
            Language::Rust,
            fixed_now(),
        )
        .unwrap();
        assert!(project.matches("MAIN"));
        assert!(project.matches("rus"));
        assert!(!project.matches("python"));
    }

    #[test]
    fn blank_code_is_rejected() {
        let err =
            SavedProject::new(ProjectId::new(1), "  \n", Language::Go, fixed_now()).unwrap_err();
        assert_eq!(err, ProjectError::EmptyCode);
    }
}
