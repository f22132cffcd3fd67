use thiserror::Error;

use crate::model::{LevelError, ProfileError, ProjectError, QuestionError};
use crate::quiz::SessionError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error(transparent)]
    Profile(#[from] ProfileError),
}
