use crate::model::Level;

/// The runner game always asks medium questions.
pub const OBSTACLE_LEVEL: u8 = 3;

/// Which game a session belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuizVariant {
    /// Five questions, 15 seconds each; passing unlocks the next level.
    Standalone,
    /// One question per obstacle hit, 30 seconds each; the run ends on the first miss.
    Obstacle,
}

impl QuizVariant {
    #[must_use]
    pub fn time_limit_secs(self) -> u32 {
        match self {
            QuizVariant::Standalone => 15,
            QuizVariant::Obstacle => 30,
        }
    }

    #[must_use]
    pub fn batch_size(self) -> usize {
        match self {
            QuizVariant::Standalone => 5,
            QuizVariant::Obstacle => 1,
        }
    }

    /// Difficulty forced by the variant, if any.
    #[must_use]
    pub fn fixed_level(self) -> Option<Level> {
        match self {
            QuizVariant::Standalone => None,
            QuizVariant::Obstacle => Level::new(OBSTACLE_LEVEL).ok(),
        }
    }
}
