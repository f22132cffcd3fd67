use std::collections::BTreeSet;
use std::sync::Arc;

use buddy_core::model::{Language, ProjectError, ProjectId, SavedProject};
use storage::repository::{NewProjectRecord, ProjectRepository, StorageError};

use crate::Clock;
use crate::error::LibraryError;

/// Aggregate numbers shown above the project list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LibraryStats {
    pub projects: usize,
    pub languages: usize,
    pub total_lines: usize,
}

impl LibraryStats {
    #[must_use]
    pub fn from_projects(projects: &[SavedProject]) -> Self {
        let languages: BTreeSet<Language> = projects.iter().map(SavedProject::language).collect();
        Self {
            projects: projects.len(),
            languages: languages.len(),
            total_lines: projects.iter().map(SavedProject::line_count).sum(),
        }
    }
}

/// Saves, searches and reopens code snippets.
#[derive(Clone)]
pub struct LibraryService {
    clock: Clock,
    projects: Arc<dyn ProjectRepository>,
}

impl LibraryService {
    #[must_use]
    pub fn new(clock: Clock, projects: Arc<dyn ProjectRepository>) -> Self {
        Self { clock, projects }
    }

    /// Save the editor contents as a new project stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Project` for blank code.
    /// Returns `LibraryError::Storage` if persistence fails.
    pub async fn save(
        &self,
        code: impl Into<String>,
        language: Language,
    ) -> Result<ProjectId, LibraryError> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(ProjectError::EmptyCode.into());
        }
        let id = self
            .projects
            .insert_project(NewProjectRecord::new(code, language, self.clock.now()))
            .await?;
        Ok(id)
    }

    /// Projects newest first, up to `limit`.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Storage` if repository access fails.
    pub async fn list(&self, limit: u32) -> Result<Vec<SavedProject>, LibraryError> {
        Ok(self.projects.list_projects(limit).await?)
    }

    /// Case-insensitive search over code and language name. A blank term
    /// matches everything.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Storage` if repository access fails.
    pub async fn search(&self, term: &str) -> Result<Vec<SavedProject>, LibraryError> {
        let mut projects = self.projects.all_projects().await?;
        let term = term.trim();
        if !term.is_empty() {
            projects.retain(|project| project.matches(term));
        }
        Ok(projects)
    }

    /// Load a project for the editor.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Storage` with `StorageError::NotFound` when the
    /// project does not exist.
    pub async fn open(&self, id: ProjectId) -> Result<SavedProject, LibraryError> {
        let project = self
            .projects
            .get_project(id)
            .await?
            .ok_or(StorageError::NotFound)?;
        Ok(project)
    }

    /// # Errors
    ///
    /// Returns `LibraryError::Storage` if the project is missing or the
    /// delete fails.
    pub async fn delete(&self, id: ProjectId) -> Result<(), LibraryError> {
        self.projects.delete_project(id).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `LibraryError::Storage` if repository access fails.
    pub async fn stats(&self) -> Result<LibraryStats, LibraryError> {
        let projects = self.projects.all_projects().await?;
        Ok(LibraryStats::from_projects(&projects))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buddy_core::time::fixed_clock;
    use chrono::Duration;
    use storage::repository::InMemoryRepository;

    fn service_at(clock: Clock, repo: &InMemoryRepository) -> LibraryService {
        LibraryService::new(clock, Arc::new(repo.clone()))
    }

    #[tokio::test]
    async fn save_search_and_stats() {
        let repo = InMemoryRepository::new();
        let mut clock = fixed_clock();
        service_at(clock, &repo)
            .save("print('hi')\nprint('there')", Language::Python)
            .await
            .unwrap();
        clock.advance(Duration::minutes(5));
        let service = service_at(clock, &repo);
        let rust = service
            .save("fn main() {}", Language::Rust)
            .await
            .unwrap();

        let listed = service.list(10).await.unwrap();
        assert_eq!(listed[0].id(), rust);
        assert_eq!(listed[0].saved_at(), clock.now());

        let hits = service.search("PYTHON").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(service.search("main").await.unwrap().len(), 1);
        assert_eq!(service.search("  ").await.unwrap().len(), 2);

        let stats = service.stats().await.unwrap();
        assert_eq!(
            stats,
            LibraryStats {
                projects: 2,
                languages: 2,
                total_lines: 3,
            }
        );
    }

    #[tokio::test]
    async fn search_and_stats_cover_the_whole_library() {
        let repo = InMemoryRepository::new();
        let service = service_at(fixed_clock(), &repo);
        for i in 0..10_050 {
            service.save(format!("let x{i} = {i};"), Language::Rust).await.unwrap();
        }
        assert_eq!(service.stats().await.unwrap().projects, 10_050);
        assert_eq!(service.search("x0 =").await.unwrap().len(), 1);
        assert_eq!(service.search("rust").await.unwrap().len(), 10_050);
    }

    #[tokio::test]
    async fn blank_code_is_rejected_and_missing_projects_error() {
        let repo = InMemoryRepository::new();
        let service = service_at(fixed_clock(), &repo);
        assert!(matches!(
            service.save("\n  ", Language::Go).await,
            Err(LibraryError::Project(ProjectError::EmptyCode))
        ));
        assert!(matches!(
            service.open(ProjectId::new(42)).await,
            Err(LibraryError::Storage(StorageError::NotFound))
        ));
    }
}
