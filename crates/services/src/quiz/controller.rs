use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use buddy_core::model::Question;
use buddy_core::quiz::{
    AnswerOutcome, BatchOutcome, FetchGeneration, FetchTicket, QuizSession, QuizVariant,
    SessionError, SessionOutcome, SessionPhase, TickOutcome,
};

use super::timer::CountdownTimer;
use crate::ai::QuestionSource;
use crate::error::AiError;

/// Invoked once with the final outcome of a play-through.
pub type CompletionCallback = Box<dyn FnOnce(SessionOutcome) + Send>;

/// Inputs the controller reacts to, tagged so stale ones can be dropped.
#[derive(Debug)]
pub enum QuizEvent {
    Tick {
        token: u64,
    },
    BatchReady {
        generation: FetchGeneration,
        result: Result<Vec<Question>, AiError>,
    },
}

/// User-facing messages raised while a quiz runs.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Notification {
    /// The question request failed; the quiz stays loading until `retry`.
    FetchFailed { status: u16, message: String },
    /// The source had no questions left for this level and language.
    NoQuestions,
    /// An obstacle run used up every question the source had; the run ends.
    OutOfQuestions,
}

impl Notification {
    /// Whether `QuizController::retry` can still help.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Notification::OutOfQuestions)
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notification::FetchFailed { message, .. } => f.write_str(message),
            Notification::NoQuestions => f.write_str("No questions available right now."),
            Notification::OutOfQuestions => f.write_str("You have answered every question available."),
        }
    }
}

/// Drives a `QuizSession`: runs the countdown, performs fetches on spawned
/// tasks and reports completion exactly once.
pub struct QuizController {
    session: QuizSession,
    source: Arc<dyn QuestionSource>,
    events_tx: UnboundedSender<QuizEvent>,
    events_rx: UnboundedReceiver<QuizEvent>,
    notifications: UnboundedSender<Notification>,
    timer: Option<CountdownTimer>,
    last_token: u64,
    fetch: Option<JoinHandle<()>>,
    on_complete: Option<CompletionCallback>,
}

impl QuizController {
    #[must_use]
    pub fn new(
        session: QuizSession,
        source: Arc<dyn QuestionSource>,
        notifications: UnboundedSender<Notification>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            session,
            source,
            events_tx,
            events_rx,
            notifications,
            timer: None,
            last_token: 0,
            fetch: None,
            on_complete: None,
        }
    }

    #[must_use]
    pub fn with_completion(mut self, callback: impl FnOnce(SessionOutcome) + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    /// Begin the session and request the first batch.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the session was already started.
    pub fn start(&mut self) -> Result<(), SessionError> {
        let ticket = self.session.start()?;
        info!(
            variant = ?self.session.variant(),
            language = %self.session.language(),
            level = %self.session.level(),
            "quiz started"
        );
        self.spawn_fetch(ticket);
        Ok(())
    }

    /// Re-issue the question request after a failure.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` outside `Loading` or while a request is pending.
    pub fn retry(&mut self) -> Result<(), SessionError> {
        let ticket = self.session.retry_fetch()?;
        info!(generation = %ticket.generation, "retrying question fetch");
        self.spawn_fetch(ticket);
        Ok(())
    }

    /// Fetch the next obstacle question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` unless an obstacle run is between questions.
    pub fn request_next(&mut self) -> Result<(), SessionError> {
        let ticket = self.session.request_next()?;
        self.disarm();
        self.spawn_fetch(ticket);
        Ok(())
    }

    /// Answer the current question. Input outside `AwaitingAnswer` is ignored.
    pub fn submit_answer(&mut self, option: usize) -> AnswerOutcome {
        let outcome = self.session.submit_answer(option);
        match outcome {
            AnswerOutcome::Ignored => {
                debug!(phase = %self.session.phase(), "ignoring answer");
            }
            AnswerOutcome::Correct { finished: false } => {
                if self.session.phase() == SessionPhase::AwaitingAnswer {
                    self.arm();
                } else {
                    self.disarm();
                }
            }
            AnswerOutcome::Correct { finished: true } | AnswerOutcome::Incorrect { .. } => {
                self.disarm();
                self.complete();
            }
        }
        outcome
    }

    /// End the run early as a loss.
    pub fn abandon(&mut self) {
        self.session.abandon();
        self.disarm();
        if let Some(fetch) = self.fetch.take() {
            fetch.abort();
        }
        self.complete();
    }

    /// No countdown is running, no request is in flight and no event is queued.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.timer.is_none()
            && self.fetch.as_ref().is_none_or(JoinHandle::is_finished)
            && self.events_rx.is_empty()
    }

    /// Wait for the next timer tick or fetch result.
    ///
    /// Returns `None` when nothing is pending (no countdown and no request in
    /// flight). Cancel safe.
    pub async fn next_event(&mut self) -> Option<QuizEvent> {
        if let Ok(event) = self.events_rx.try_recv() {
            return Some(event);
        }
        if self.is_idle() {
            return None;
        }
        self.events_rx.recv().await
    }

    /// Apply one event. Returns `false` when the event was stale and dropped.
    pub fn handle_event(&mut self, event: QuizEvent) -> bool {
        match event {
            QuizEvent::Tick { token } => self.on_tick(token),
            QuizEvent::BatchReady { generation, result } => self.on_batch(generation, result),
        }
    }

    /// Wait for and apply one event. Returns `false` when idle.
    pub async fn pump(&mut self) -> bool {
        match self.next_event().await {
            Some(event) => {
                self.handle_event(event);
                true
            }
            None => false,
        }
    }

    fn on_tick(&mut self, token: u64) -> bool {
        if self.timer.as_ref().map(CountdownTimer::token) != Some(token) {
            debug!(token, "discarding tick from a cancelled countdown");
            return false;
        }
        match self.session.tick() {
            TickOutcome::Ignored => false,
            TickOutcome::Running { .. } => true,
            TickOutcome::TimedOut => {
                info!(score = self.session.score(), "question timed out");
                self.disarm();
                self.complete();
                true
            }
        }
    }

    fn on_batch(
        &mut self,
        generation: FetchGeneration,
        result: Result<Vec<Question>, AiError>,
    ) -> bool {
        if self.session.pending_generation() == Some(generation) {
            self.fetch = None;
        }
        match result {
            Ok(questions) => match self.session.receive_batch(generation, questions) {
                Ok(BatchOutcome::Accepted { count }) => {
                    info!(%generation, count, "questions ready");
                    self.arm();
                    true
                }
                Ok(BatchOutcome::Stale) => {
                    warn!(%generation, "discarding stale question batch");
                    false
                }
                Err(SessionError::EmptyBatch) if self.session.variant() == QuizVariant::Obstacle => {
                    info!(%generation, score = self.session.score(), "question pool exhausted");
                    self.notify(Notification::OutOfQuestions);
                    self.session.abandon();
                    self.complete();
                    true
                }
                Err(SessionError::EmptyBatch) => {
                    warn!(%generation, "question source returned nothing");
                    self.notify(Notification::NoQuestions);
                    true
                }
                Err(err) => {
                    warn!(%generation, error = %err, "could not apply question batch");
                    false
                }
            },
            Err(err) => {
                if !self.session.fetch_failed(generation) {
                    warn!(%generation, error = %err, "discarding stale fetch failure");
                    return false;
                }
                error!(%generation, error = %err, "question fetch failed");
                self.notify(Notification::FetchFailed {
                    status: err.status_code(),
                    message: err.to_string(),
                });
                true
            }
        }
    }

    fn spawn_fetch(&mut self, ticket: FetchTicket) {
        if let Some(previous) = self.fetch.take() {
            previous.abort();
        }
        let source = Arc::clone(&self.source);
        let events = self.events_tx.clone();
        self.fetch = Some(tokio::spawn(async move {
            let generation = ticket.generation;
            let result = source.next_batch(&ticket).await;
            if events
                .send(QuizEvent::BatchReady { generation, result })
                .is_err()
            {
                debug!(%generation, "quiz closed before questions arrived");
            }
        }));
    }

    fn arm(&mut self) {
        self.last_token += 1;
        self.timer = Some(CountdownTimer::start(
            self.last_token,
            self.events_tx.clone(),
        ));
    }

    fn disarm(&mut self) {
        self.timer = None;
    }

    fn notify(&self, notification: Notification) {
        if self.notifications.send(notification).is_err() {
            debug!("notification receiver dropped");
        }
    }

    fn complete(&mut self) {
        let Some(outcome) = self.session.take_outcome() else {
            return;
        };
        info!(
            passed = outcome.passed,
            score = outcome.score,
            answered = outcome.answered,
            "quiz finished"
        );
        if let Some(callback) = self.on_complete.take() {
            callback(outcome);
        }
    }
}

impl Drop for QuizController {
    fn drop(&mut self) {
        if let Some(fetch) = self.fetch.take() {
            fetch.abort();
        }
    }
}
