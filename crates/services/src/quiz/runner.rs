use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use buddy_core::model::Language;
use buddy_core::quiz::{
    AnswerOutcome, Move, Obstacle, ObstacleCourse, QuizSession, SessionError, SessionPhase,
};

use super::controller::{Notification, QuizController};
use crate::ai::QuestionSource;

/// The runner game: an obstacle course whose collisions pose questions.
///
/// The first collision starts the underlying obstacle session; later ones
/// request the next question. The run ends on the first miss or timeout.
pub struct RunnerGame {
    course: ObstacleCourse,
    controller: QuizController,
}

impl RunnerGame {
    #[must_use]
    pub fn new(
        language: Language,
        source: Arc<dyn QuestionSource>,
        notifications: UnboundedSender<Notification>,
    ) -> Self {
        Self::with_controller(QuizController::new(
            QuizSession::obstacle(language),
            source,
            notifications,
        ))
    }

    #[must_use]
    pub fn with_controller(controller: QuizController) -> Self {
        Self {
            course: ObstacleCourse::new(),
            controller,
        }
    }

    #[must_use]
    pub fn course(&self) -> &ObstacleCourse {
        &self.course
    }

    #[must_use]
    pub fn controller(&self) -> &QuizController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut QuizController {
        &mut self.controller
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.controller.session().is_finished()
    }

    #[must_use]
    pub fn points(&self) -> u32 {
        ObstacleCourse::points(self.controller.session().score())
    }

    pub fn move_player(&mut self, direction: Move) -> bool {
        self.course.move_player(direction)
    }

    /// Advance one animation frame with a uniform spawn roll in `[0, 1)`.
    ///
    /// Returns the obstacle that hit the runner, if any.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if a collision happens while the session cannot
    /// take another question.
    pub fn frame(&mut self, spawn_roll: f64) -> Result<Option<Obstacle>, SessionError> {
        if self.is_over() {
            self.course.freeze();
            return Ok(None);
        }
        let Some(hit) = self.course.step(ObstacleCourse::should_spawn(spawn_roll)) else {
            return Ok(None);
        };
        if self.controller.phase() == SessionPhase::NotStarted {
            self.controller.start()?;
        } else {
            self.controller.request_next()?;
        }
        Ok(Some(hit))
    }

    /// Answer the posed question; a correct answer releases the track.
    pub fn submit_answer(&mut self, option: usize) -> AnswerOutcome {
        let outcome = self.controller.submit_answer(option);
        if self.controller.phase() == SessionPhase::Revealed {
            self.course.resume();
        }
        outcome
    }

    pub fn abandon(&mut self) {
        self.course.freeze();
        self.controller.abandon();
    }
}
