use std::fmt;

use thiserror::Error;

use crate::model::{Language, Level, Question};
use crate::quiz::{AskedQuestions, QuizVariant};

//
// ─── TYPES ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    NotStarted,
    /// Waiting for a question batch; input is ignored.
    Loading,
    AwaitingAnswer,
    /// Last answer was correct and the runner is moving again (obstacle runs only).
    Revealed,
    Finished,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::NotStarted => "not started",
            SessionPhase::Loading => "loading",
            SessionPhase::AwaitingAnswer => "awaiting answer",
            SessionPhase::Revealed => "revealed",
            SessionPhase::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// Monotonic id attached to every question request of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FetchGeneration(u64);

impl FetchGeneration {
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for FetchGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything a question source needs to produce the next batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: FetchGeneration,
    pub language: Language,
    pub level: Level,
    pub count: usize,
    /// Every prompt shown so far in this play-through.
    pub exclude: Vec<String>,
}

/// Final result of a play-through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOutcome {
    pub passed: bool,
    pub score: u32,
    pub answered: u32,
    pub presented: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    Accepted { count: usize },
    /// The batch belongs to a superseded request and was dropped.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Ignored,
    Running { remaining_secs: u32 },
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Not awaiting an answer (already answered, loading, or finished).
    Ignored,
    Correct { finished: bool },
    Incorrect { correct_answer: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("cannot {action} while {phase}")]
    InvalidTransition {
        phase: SessionPhase,
        action: &'static str,
    },

    #[error("a question request is already in flight ({0})")]
    FetchInFlight(FetchGeneration),

    #[error("question source returned no questions")]
    EmptyBatch,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One play-through of a quiz or runner game.
///
/// Pure state machine: it never sleeps or performs I/O. Callers feed it
/// question batches and one `tick` per elapsed second.
#[derive(Debug, Clone)]
pub struct QuizSession {
    variant: QuizVariant,
    language: Language,
    level: Level,
    phase: SessionPhase,
    questions: Vec<Question>,
    index: usize,
    score: u32,
    answered: u32,
    presented: u32,
    remaining_secs: u32,
    asked: AskedQuestions,
    generation: FetchGeneration,
    pending: Option<FetchGeneration>,
    outcome: Option<SessionOutcome>,
    outcome_reported: bool,
}

impl QuizSession {
    #[must_use]
    pub fn new(variant: QuizVariant, language: Language, level: Level) -> Self {
        Self {
            variant,
            language,
            level: variant.fixed_level().unwrap_or(level),
            phase: SessionPhase::NotStarted,
            questions: Vec::new(),
            index: 0,
            score: 0,
            answered: 0,
            presented: 0,
            remaining_secs: variant.time_limit_secs(),
            asked: AskedQuestions::new(),
            generation: FetchGeneration::default(),
            pending: None,
            outcome: None,
            outcome_reported: false,
        }
    }

    #[must_use]
    pub fn standalone(language: Language, level: Level) -> Self {
        Self::new(QuizVariant::Standalone, language, level)
    }

    #[must_use]
    pub fn obstacle(language: Language) -> Self {
        Self::new(QuizVariant::Obstacle, language, Level::default())
    }

    /// Keep the asked history from an earlier play-through.
    #[must_use]
    pub fn with_history(mut self, asked: AskedQuestions) -> Self {
        self.asked = asked;
        self
    }

    /// Begin the session and request the first batch.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless the session is new.
    pub fn start(&mut self) -> Result<FetchTicket, SessionError> {
        self.expect_phase(SessionPhase::NotStarted, "start")?;
        self.remaining_secs = self.variant.time_limit_secs();
        self.phase = SessionPhase::Loading;
        Ok(self.issue_ticket())
    }

    /// Re-issue the request after a failed fetch.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` outside `Loading`, or
    /// `SessionError::FetchInFlight` while a request is still pending.
    pub fn retry_fetch(&mut self) -> Result<FetchTicket, SessionError> {
        self.expect_phase(SessionPhase::Loading, "retry fetch")?;
        if let Some(pending) = self.pending {
            return Err(SessionError::FetchInFlight(pending));
        }
        Ok(self.issue_ticket())
    }

    /// Ask for the next question after the runner hits an obstacle.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless this is an obstacle run
    /// in `Revealed`.
    pub fn request_next(&mut self) -> Result<FetchTicket, SessionError> {
        if self.variant != QuizVariant::Obstacle {
            return Err(SessionError::InvalidTransition {
                phase: self.phase,
                action: "request another question",
            });
        }
        self.expect_phase(SessionPhase::Revealed, "request another question")?;
        self.remaining_secs = self.variant.time_limit_secs();
        self.phase = SessionPhase::Loading;
        Ok(self.issue_ticket())
    }

    /// Apply a batch produced for `generation`.
    ///
    /// Batches for anything but the pending request are reported as stale and
    /// leave the session untouched. Oversized batches are cut to the variant's
    /// batch size.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyBatch` for an empty batch; the request is
    /// cleared and the session stays in `Loading` awaiting `retry_fetch`.
    pub fn receive_batch(
        &mut self,
        generation: FetchGeneration,
        mut questions: Vec<Question>,
    ) -> Result<BatchOutcome, SessionError> {
        if self.phase != SessionPhase::Loading || self.pending != Some(generation) {
            return Ok(BatchOutcome::Stale);
        }
        self.pending = None;
        if questions.is_empty() {
            return Err(SessionError::EmptyBatch);
        }

        questions.truncate(self.variant.batch_size());
        for question in &questions {
            self.asked.record(question.prompt());
        }
        let count = questions.len();
        self.questions = questions;
        self.index = 0;
        self.present_current();
        Ok(BatchOutcome::Accepted { count })
    }

    /// Mark the pending request as failed. Returns `false` for stale failures.
    pub fn fetch_failed(&mut self, generation: FetchGeneration) -> bool {
        if self.phase == SessionPhase::Loading && self.pending == Some(generation) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// One second elapsed. Reaching zero counts as a missed answer.
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != SessionPhase::AwaitingAnswer {
            return TickOutcome::Ignored;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.finish(false);
            TickOutcome::TimedOut
        } else {
            TickOutcome::Running {
                remaining_secs: self.remaining_secs,
            }
        }
    }

    /// Answer the current question with the option at `option`.
    pub fn submit_answer(&mut self, option: usize) -> AnswerOutcome {
        if self.phase != SessionPhase::AwaitingAnswer {
            return AnswerOutcome::Ignored;
        }
        let Some(question) = self.questions.get(self.index) else {
            return AnswerOutcome::Ignored;
        };
        let correct_answer = question.correct_answer();
        self.answered += 1;

        if !question.is_correct(option) {
            self.finish(false);
            return AnswerOutcome::Incorrect { correct_answer };
        }

        self.score += 1;
        match self.variant {
            QuizVariant::Standalone if self.index + 1 < self.questions.len() => {
                self.index += 1;
                self.present_current();
                AnswerOutcome::Correct { finished: false }
            }
            QuizVariant::Standalone => {
                self.finish(true);
                AnswerOutcome::Correct { finished: true }
            }
            QuizVariant::Obstacle => {
                self.phase = SessionPhase::Revealed;
                AnswerOutcome::Correct { finished: false }
            }
        }
    }

    /// End the session early as a loss (player quit or view torn down).
    pub fn abandon(&mut self) {
        if self.phase != SessionPhase::Finished {
            self.pending = None;
            self.finish(false);
        }
    }

    /// The final outcome, handed out exactly once.
    pub fn take_outcome(&mut self) -> Option<SessionOutcome> {
        if self.outcome_reported {
            return None;
        }
        let outcome = self.outcome?;
        self.outcome_reported = true;
        Some(outcome)
    }

    fn issue_ticket(&mut self) -> FetchTicket {
        self.generation = self.generation.next();
        self.pending = Some(self.generation);
        FetchTicket {
            generation: self.generation,
            language: self.language,
            level: self.level,
            count: self.variant.batch_size(),
            exclude: self.asked.to_vec(),
        }
    }

    fn present_current(&mut self) {
        self.remaining_secs = self.variant.time_limit_secs();
        self.presented += 1;
        self.phase = SessionPhase::AwaitingAnswer;
    }

    fn finish(&mut self, passed: bool) {
        self.phase = SessionPhase::Finished;
        self.outcome = Some(SessionOutcome {
            passed,
            score: self.score,
            answered: self.answered,
            presented: self.presented,
        });
    }

    fn expect_phase(
        &self,
        expected: SessionPhase,
        action: &'static str,
    ) -> Result<(), SessionError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                phase: self.phase,
                action,
            })
        }
    }

    // ─── Accessors ─────────────────────────────────────────────────────────────

    #[must_use]
    pub fn variant(&self) -> QuizVariant {
        self.variant
    }

    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }

    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase == SessionPhase::Finished
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.phase == SessionPhase::Loading
    }

    /// The question on screen, only while an answer is expected.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.phase == SessionPhase::AwaitingAnswer {
            self.questions.get(self.index)
        } else {
            None
        }
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn answered(&self) -> u32 {
        self.answered
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    #[must_use]
    pub fn asked(&self) -> &AskedQuestions {
        &self.asked
    }

    #[must_use]
    pub fn pending_generation(&self) -> Option<FetchGeneration> {
        self.pending
    }

    #[must_use]
    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.outcome
    }
}
