use std::sync::Arc;

use buddy_core::model::Language;
use storage::repository::Storage;

use crate::Clock;
use crate::ai::{
    AiClient, AiConfig, AiQuestionSource, CodeAnalyzer, CodeSuggester, QuestionSource,
    StaticQuestionSource,
};
use crate::error::AppServicesError;
use crate::library_service::LibraryService;
use crate::profile_service::ProfileService;

/// Assembles app-facing services over one storage backend and AI client.
#[derive(Clone)]
pub struct AppServices {
    library: Arc<LibraryService>,
    profiles: Arc<ProfileService>,
    ai: Arc<AiClient>,
    analyzer: Arc<CodeAnalyzer>,
    suggester: Arc<CodeSuggester>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        ai_config: Option<AiConfig>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, ai_config))
    }

    #[must_use]
    pub fn in_memory(clock: Clock, ai_config: Option<AiConfig>) -> Self {
        Self::from_storage(&Storage::in_memory(), clock, ai_config)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock, ai_config: Option<AiConfig>) -> Self {
        let ai = Arc::new(AiClient::new(ai_config));
        Self {
            library: Arc::new(LibraryService::new(clock, Arc::clone(&storage.projects))),
            profiles: Arc::new(ProfileService::new(Arc::clone(&storage.profiles))),
            analyzer: Arc::new(CodeAnalyzer::new(Arc::clone(&ai))),
            suggester: Arc::new(CodeSuggester::new(Arc::clone(&ai))),
            ai,
        }
    }

    #[must_use]
    pub fn ai_enabled(&self) -> bool {
        self.ai.enabled()
    }

    /// Question source for a new `language` quiz: AI-generated when
    /// requested and configured, the built-in bank otherwise.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::NotQuizzable` for languages without quizzes
    /// and `AppServicesError::NotInBank` when the chosen source has no
    /// questions for `language`.
    pub fn question_source(
        &self,
        prefer_ai: bool,
        language: Language,
    ) -> Result<Arc<dyn QuestionSource>, AppServicesError> {
        if !language.is_quizzable() {
            return Err(AppServicesError::NotQuizzable(language));
        }
        let source: Arc<dyn QuestionSource> = if prefer_ai && self.ai.enabled() {
            Arc::new(AiQuestionSource::new(Arc::clone(&self.ai)))
        } else {
            Arc::new(StaticQuestionSource::builtin())
        };
        if source.supports(language) {
            Ok(source)
        } else {
            Err(AppServicesError::NotInBank(language))
        }
    }

    #[must_use]
    pub fn library(&self) -> Arc<LibraryService> {
        Arc::clone(&self.library)
    }

    #[must_use]
    pub fn profiles(&self) -> Arc<ProfileService> {
        Arc::clone(&self.profiles)
    }

    #[must_use]
    pub fn analyzer(&self) -> Arc<CodeAnalyzer> {
        Arc::clone(&self.analyzer)
    }

    #[must_use]
    pub fn suggester(&self) -> Arc<CodeSuggester> {
        Arc::clone(&self.suggester)
    }
}
