mod ids;
mod language;
mod profile;
mod project;
mod question;

pub use ids::ProjectId;
pub use language::{Language, Level, LevelError, UnknownLanguage};
pub use profile::{ProfileError, UserProfile};
pub use project::{ProjectError, SavedProject};
pub use question::{OPTION_COUNT, Question, QuestionError};
