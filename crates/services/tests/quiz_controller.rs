use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use buddy_core::model::{Language, Level, Question};
use buddy_core::quiz::{AnswerOutcome, FetchTicket, QuizSession, SessionOutcome, SessionPhase};
use services::ai::{QuestionSource, StaticQuestionSource};
use services::{AiError, Notification, QuizController, QuizEvent, RunnerGame};
use tokio::sync::mpsc::{self, UnboundedReceiver};

/// Replays queued results and records every ticket it was asked for.
#[derive(Default)]
struct ScriptedSource {
    replies: Mutex<VecDeque<Result<Vec<Question>, AiError>>>,
    tickets: Mutex<Vec<FetchTicket>>,
}

impl ScriptedSource {
    fn with(replies: Vec<Result<Vec<Question>, AiError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            tickets: Mutex::default(),
        })
    }

    fn tickets(&self) -> Vec<FetchTicket> {
        self.tickets.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuestionSource for ScriptedSource {
    async fn next_batch(&self, ticket: &FetchTicket) -> Result<Vec<Question>, AiError> {
        self.tickets.lock().unwrap().push(ticket.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

fn questions(prefix: &str, n: usize) -> Vec<Question> {
    (1..=n)
        .map(|i| {
            Question::new(
                format!("{prefix} question {i}?"),
                vec!["right".into(), "wrong".into(), "no".into(), "nope".into()],
                0,
                "Testing",
                None,
            )
            .unwrap()
        })
        .collect()
}

type Outcomes = Arc<Mutex<Vec<SessionOutcome>>>;

fn standalone(
    source: Arc<ScriptedSource>,
) -> (QuizController, UnboundedReceiver<Notification>, Outcomes) {
    let (tx, rx) = mpsc::unbounded_channel();
    let outcomes: Outcomes = Arc::default();
    let sink = Arc::clone(&outcomes);
    let controller = QuizController::new(
        QuizSession::standalone(Language::JavaScript, Level::MIN),
        source,
        tx,
    )
    .with_completion(move |outcome| sink.lock().unwrap().push(outcome));
    (controller, rx, outcomes)
}

#[tokio::test(start_paused = true)]
async fn five_correct_answers_pass() {
    let source = ScriptedSource::with(vec![Ok(questions("js", 5))]);
    let (mut controller, mut notes, outcomes) = standalone(source);

    controller.start().unwrap();
    assert_eq!(controller.submit_answer(0), AnswerOutcome::Ignored);
    assert!(controller.pump().await);
    assert_eq!(controller.phase(), SessionPhase::AwaitingAnswer);

    for _ in 0..4 {
        assert_eq!(
            controller.submit_answer(0),
            AnswerOutcome::Correct { finished: false }
        );
    }
    assert_eq!(
        controller.submit_answer(0),
        AnswerOutcome::Correct { finished: true }
    );
    assert_eq!(controller.submit_answer(0), AnswerOutcome::Ignored);

    let outcomes = outcomes.lock().unwrap().clone();
    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].passed);
    assert_eq!(outcomes[0].score, 5);
    assert!(notes.try_recv().is_err());
    assert!(!controller.pump().await);
}

#[tokio::test(start_paused = true)]
async fn wrong_second_answer_fails_with_score_one() {
    let source = ScriptedSource::with(vec![Ok(questions("js", 5))]);
    let (mut controller, _notes, outcomes) = standalone(source);

    controller.start().unwrap();
    controller.pump().await;
    controller.submit_answer(0);
    assert_eq!(
        controller.submit_answer(2),
        AnswerOutcome::Incorrect { correct_answer: 0 }
    );

    assert_eq!(controller.phase(), SessionPhase::Finished);
    let outcome = outcomes.lock().unwrap()[0];
    assert!(!outcome.passed);
    assert_eq!(outcome.score, 1);
    assert_eq!(outcome.answered, 2);
}

#[tokio::test(start_paused = true)]
async fn silence_times_out_after_fifteen_seconds() {
    let source = ScriptedSource::with(vec![Ok(questions("js", 5))]);
    let (mut controller, _notes, outcomes) = standalone(source);

    controller.start().unwrap();
    controller.pump().await;
    let started = tokio::time::Instant::now();
    while controller.pump().await {}

    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(15));
    assert!(elapsed < Duration::from_secs(16));
    assert_eq!(controller.phase(), SessionPhase::Finished);

    let outcomes = outcomes.lock().unwrap().clone();
    assert_eq!(outcomes.len(), 1);
    assert!(!outcomes[0].passed);
    assert_eq!(outcomes[0].score, 0);
    assert_eq!(outcomes[0].answered, 0);
}

#[tokio::test(start_paused = true)]
async fn next_question_gets_a_fresh_countdown() {
    let source = ScriptedSource::with(vec![Ok(questions("js", 5))]);
    let (mut controller, _notes, _outcomes) = standalone(source);

    controller.start().unwrap();
    controller.pump().await;
    for _ in 0..10 {
        assert!(controller.pump().await);
    }
    assert_eq!(controller.session().remaining_secs(), 5);

    controller.submit_answer(0);
    assert_eq!(controller.session().remaining_secs(), 15);
    controller.pump().await;
    assert_eq!(controller.session().remaining_secs(), 14);
}

#[tokio::test(start_paused = true)]
async fn rate_limit_leaves_quiz_loading_with_one_notification() {
    let source = ScriptedSource::with(vec![
        Err(AiError::RateLimited),
        Ok(questions("retry", 5)),
    ]);
    let (mut controller, mut notes, outcomes) = standalone(Arc::clone(&source));

    controller.start().unwrap();
    assert!(controller.pump().await);

    assert_eq!(controller.phase(), SessionPhase::Loading);
    assert!(controller.session().current_question().is_none());
    match notes.try_recv() {
        Ok(Notification::FetchFailed { status, message }) => {
            assert_eq!(status, 429);
            assert_eq!(message, "Rate limit exceeded. Please try again later.");
        }
        other => panic!("expected fetch failure, got {other:?}"),
    }
    assert!(notes.try_recv().is_err());
    assert!(!controller.pump().await, "no automatic retry");
    assert!(outcomes.lock().unwrap().is_empty());

    controller.retry().unwrap();
    controller.pump().await;
    assert_eq!(controller.phase(), SessionPhase::AwaitingAnswer);
    assert_eq!(source.tickets().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn superseded_batches_are_discarded() {
    let source = ScriptedSource::with(vec![
        Err(AiError::EmptyResponse),
        Ok(questions("fresh", 5)),
    ]);
    let (mut controller, _notes, _outcomes) = standalone(Arc::clone(&source));

    controller.start().unwrap();
    controller.pump().await;
    let first = source.tickets()[0].generation;

    controller.retry().unwrap();
    let applied = controller.handle_event(QuizEvent::BatchReady {
        generation: first,
        result: Ok(questions("stale", 5)),
    });
    assert!(!applied);
    assert_eq!(controller.phase(), SessionPhase::Loading);

    controller.pump().await;
    let current = controller.session().current_question().unwrap();
    assert!(current.prompt().starts_with("fresh"));
    assert_ne!(source.tickets()[1].generation, first);
}

#[tokio::test(start_paused = true)]
async fn exclusion_list_grows_across_fetches() {
    let source = ScriptedSource::with(vec![Ok(questions("a", 5))]);
    let (mut controller, _notes, _outcomes) = standalone(Arc::clone(&source));
    controller.start().unwrap();
    controller.pump().await;
    assert_eq!(controller.session().asked().len(), 5);

    let history = controller.session().asked().clone();
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut next = QuizController::new(
        QuizSession::standalone(Language::JavaScript, Level::MIN).with_history(history),
        source.clone(),
        tx,
    );
    next.start().unwrap();
    next.pump().await;
    let tickets = source.tickets();
    assert_eq!(tickets[1].exclude.len(), 5);
    assert!(tickets[1].exclude.contains(&"a question 3?".to_string()));
}

#[tokio::test(start_paused = true)]
async fn abandon_reports_once() {
    let source = ScriptedSource::with(vec![Ok(questions("js", 5))]);
    let (mut controller, _notes, outcomes) = standalone(source);
    controller.start().unwrap();
    controller.pump().await;

    controller.abandon();
    controller.abandon();
    assert_eq!(outcomes.lock().unwrap().len(), 1);
    assert!(!controller.pump().await);
}

#[tokio::test(start_paused = true)]
async fn runner_collisions_pose_questions_until_a_miss() {
    let source = ScriptedSource::with(vec![Ok(questions("run", 1)), Ok(questions("run2", 1))]);
    let (tx, _notes) = mpsc::unbounded_channel();
    let mut game = RunnerGame::new(Language::Python, source.clone(), tx);

    async fn run_to_collision(game: &mut RunnerGame) {
        assert_eq!(game.frame(0.99).unwrap(), None);
        for _ in 0..100 {
            if game.frame(0.0).unwrap().is_some() {
                return;
            }
        }
        panic!("no collision");
    }

    run_to_collision(&mut game).await;
    assert!(game.course().is_frozen());
    assert_eq!(game.controller().phase(), SessionPhase::Loading);
    game.controller_mut().pump().await;
    assert_eq!(game.controller().phase(), SessionPhase::AwaitingAnswer);

    assert_eq!(game.submit_answer(0), AnswerOutcome::Correct { finished: false });
    assert!(!game.course().is_frozen());
    assert_eq!(game.points(), 10);

    run_to_collision(&mut game).await;
    game.controller_mut().pump().await;
    assert!(matches!(
        game.submit_answer(1),
        AnswerOutcome::Incorrect { .. }
    ));
    assert!(game.is_over());
    assert_eq!(game.frame(0.99).unwrap(), None);

    let tickets = source.tickets();
    assert_eq!(tickets.len(), 2);
    assert!(tickets.iter().all(|t| t.level.value() == 3 && t.count == 1));
    assert_eq!(tickets[1].exclude, vec!["run question 1?".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn static_runner_ends_when_the_bank_runs_dry() {
    let (tx, mut notes) = mpsc::unbounded_channel();
    let mut game = RunnerGame::new(
        Language::Python,
        Arc::new(StaticQuestionSource::builtin()),
        tx,
    );

    let mut correct = 0;
    for _ in 0..20 {
        assert_eq!(game.frame(0.99).unwrap(), None);
        while game.frame(0.0).unwrap().is_none() {}
        game.controller_mut().pump().await;
        if game.is_over() {
            break;
        }
        let answer = game
            .controller()
            .session()
            .current_question()
            .unwrap()
            .correct_answer();
        assert_eq!(game.submit_answer(answer), AnswerOutcome::Correct { finished: false });
        correct += 1;
    }

    assert_eq!(correct, 5);
    assert!(game.is_over());
    assert_eq!(game.points(), 50);
    assert_eq!(game.controller().phase(), SessionPhase::Finished);
    let note = notes.try_recv().unwrap();
    assert_eq!(note, Notification::OutOfQuestions);
    assert!(!note.is_retryable());
    assert!(game.controller().is_idle());
}
