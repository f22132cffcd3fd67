#![forbid(unsafe_code)]

pub mod ai;
pub mod app_services;
pub mod error;
pub mod library_service;
pub mod profile_service;
pub mod quiz;

pub use buddy_core::Clock;

pub use app_services::AppServices;
pub use error::{AiError, AppServicesError, ErrorBody, LibraryError, ProfileServiceError};
pub use library_service::{LibraryService, LibraryStats};
pub use profile_service::ProfileService;
pub use quiz::{Notification, QuizController, QuizEvent, RunnerGame};
