use async_trait::async_trait;
use buddy_core::model::{Language, ProjectId, SavedProject, UserProfile};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A project about to be saved; the repository assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProjectRecord {
    pub code: String,
    pub language: Language,
    pub saved_at: DateTime<Utc>,
}

impl NewProjectRecord {
    #[must_use]
    pub fn new(code: impl Into<String>, language: Language, saved_at: DateTime<Utc>) -> Self {
        Self {
            code: code.into(),
            language,
            saved_at,
        }
    }
}

/// Repository contract for the project library.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Store a new project and return its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the project cannot be stored.
    async fn insert_project(&self, project: NewProjectRecord) -> Result<ProjectId, StorageError>;

    /// Fetch a project by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend failures; a missing project is `Ok(None)`.
    async fn get_project(&self, id: ProjectId) -> Result<Option<SavedProject>, StorageError>;

    /// List projects, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend failures.
    async fn list_projects(&self, limit: u32) -> Result<Vec<SavedProject>, StorageError>;

    /// Every project, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend failures.
    async fn all_projects(&self) -> Result<Vec<SavedProject>, StorageError>;

    /// Remove a project.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the project does not exist.
    async fn delete_project(&self, id: ProjectId) -> Result<(), StorageError>;
}

/// Repository contract for the single local profile.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Load the stored profile, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend failures.
    async fn get_profile(&self) -> Result<Option<UserProfile>, StorageError>;

    /// Overwrite the stored profile.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the profile cannot be stored.
    async fn save_profile(&self, profile: &UserProfile) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    projects: Arc<Mutex<BTreeMap<ProjectId, SavedProject>>>,
    next_project_id: Arc<Mutex<u64>>,
    profile: Arc<Mutex<Option<UserProfile>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl ProjectRepository for InMemoryRepository {
    async fn insert_project(&self, project: NewProjectRecord) -> Result<ProjectId, StorageError> {
        let id = {
            let mut next = self.next_project_id.lock().map_err(poisoned)?;
            *next += 1;
            ProjectId::new(*next)
        };
        let saved = SavedProject::new(id, project.code, project.language, project.saved_at)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.projects.lock().map_err(poisoned)?.insert(id, saved);
        Ok(id)
    }

    async fn get_project(&self, id: ProjectId) -> Result<Option<SavedProject>, StorageError> {
        let guard = self.projects.lock().map_err(poisoned)?;
        Ok(guard.get(&id).cloned())
    }

    async fn list_projects(&self, limit: u32) -> Result<Vec<SavedProject>, StorageError> {
        let mut projects = self.all_projects().await?;
        projects.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(projects)
    }

    async fn all_projects(&self) -> Result<Vec<SavedProject>, StorageError> {
        let guard = self.projects.lock().map_err(poisoned)?;
        let mut projects: Vec<SavedProject> = guard.values().cloned().collect();
        projects.sort_by(|a, b| {
            b.saved_at()
                .cmp(&a.saved_at())
                .then_with(|| b.id().cmp(&a.id()))
        });
        Ok(projects)
    }

    async fn delete_project(&self, id: ProjectId) -> Result<(), StorageError> {
        let mut guard = self.projects.lock().map_err(poisoned)?;
        guard.remove(&id).map(|_| ()).ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl ProfileRepository for InMemoryRepository {
    async fn get_profile(&self) -> Result<Option<UserProfile>, StorageError> {
        Ok(self.profile.lock().map_err(poisoned)?.clone())
    }

    async fn save_profile(&self, profile: &UserProfile) -> Result<(), StorageError> {
        *self.profile.lock().map_err(poisoned)? = Some(profile.clone());
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub projects: Arc<dyn ProjectRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let projects: Arc<dyn ProjectRepository> = Arc::new(repo.clone());
        let profiles: Arc<dyn ProfileRepository> = Arc::new(repo);
        Self { projects, profiles }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buddy_core::time::fixed_now;
    use chrono::Duration;

    #[tokio::test]
    async fn lists_newest_first_and_deletes() {
        let repo = InMemoryRepository::new();
        let now = fixed_now();
        let older = repo
            .insert_project(NewProjectRecord::new("print(1)", Language::Python, now))
            .await
            .unwrap();
        let newer = repo
            .insert_project(NewProjectRecord::new(
                "fn main() {}",
                Language::Rust,
                now + Duration::minutes(1),
            ))
            .await
            .unwrap();

        let listed = repo.list_projects(10).await.unwrap();
        let ids: Vec<ProjectId> = listed.iter().map(SavedProject::id).collect();
        assert_eq!(ids, vec![newer, older]);
        assert_eq!(repo.list_projects(1).await.unwrap().len(), 1);
        assert_eq!(repo.all_projects().await.unwrap(), listed);

        repo.delete_project(older).await.unwrap();
        assert!(repo.get_project(older).await.unwrap().is_none());
        assert!(matches!(
            repo.delete_project(older).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn rejects_blank_projects() {
        let repo = InMemoryRepository::new();
        let result = repo
            .insert_project(NewProjectRecord::new("  ", Language::Go, fixed_now()))
            .await;
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }

    #[tokio::test]
    async fn profile_overwrites_wholesale() {
        let repo = InMemoryRepository::new();
        assert!(repo.get_profile().await.unwrap().is_none());
        let profile = UserProfile::new("Ada", None).unwrap();
        repo.save_profile(&profile).await.unwrap();
        let replaced = UserProfile::new("Grace", None).unwrap();
        repo.save_profile(&replaced).await.unwrap();
        assert_eq!(repo.get_profile().await.unwrap(), Some(replaced));
    }
}
