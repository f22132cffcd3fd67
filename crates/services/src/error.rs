//! Shared error types for the services crate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use buddy_core::model::{Language, ProfileError, ProjectError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the AI gateway and the services built on it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AiError {
    #[error("AI features are not configured")]
    Disabled,
    #[error("{0}")]
    Validation(&'static str),
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,
    #[error("Payment required. Please add credits to continue.")]
    PaymentRequired,
    #[error("AI gateway request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("AI gateway returned an empty response")]
    EmptyResponse,
    #[error("AI gateway returned an unusable response: {0}")]
    MalformedResponse(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl AiError {
    /// HTTP status a caller-facing endpoint reports for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            AiError::Validation(_) => 400,
            AiError::RateLimited => 429,
            AiError::PaymentRequired => 402,
            AiError::Disabled
            | AiError::HttpStatus(_)
            | AiError::EmptyResponse
            | AiError::MalformedResponse(_)
            | AiError::Http(_) => 500,
        }
    }

    #[must_use]
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            error: self.to_string(),
        }
    }
}

/// `{ "error": "..." }`, the shape every AI endpoint uses for failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Errors emitted by `LibraryService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LibraryError {
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProfileService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProfileServiceError {
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("{0} has no quiz questions")]
    NotQuizzable(Language),
    #[error("the built-in question bank has no {0} questions; set BUDDY_AI_API_KEY to use the AI gateway")]
    NotInBank(Language),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_errors_map_to_status_and_body() {
        assert_eq!(AiError::RateLimited.status_code(), 429);
        assert_eq!(AiError::PaymentRequired.status_code(), 402);
        assert_eq!(AiError::EmptyResponse.status_code(), 500);

        let body = AiError::Validation("Code and language are required").to_body();
        assert_eq!(body.error, "Code and language are required");
        assert_eq!(
            serde_json::to_string(&AiError::RateLimited.to_body()).unwrap(),
            r#"{"error":"Rate limit exceeded. Please try again later."}"#
        );
    }
}
