use std::sync::Arc;

use buddy_core::model::{Level, Question};
use buddy_core::quiz::{AnswerOutcome, AskedQuestions, QuizSession, SessionOutcome, SessionPhase};
use services::ai::QuestionSource;
use services::{AppServices, Notification, QuizController, QuizEvent};
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

use super::{InputLines, parse_option, stdin_lines};
use crate::cli::QuizArgs;

const LETTERS: [char; 4] = ['a', 'b', 'c', 'd'];

pub async fn play(services: &AppServices, args: QuizArgs) -> anyhow::Result<()> {
    if args.ai && !services.ai_enabled() {
        warn!("BUDDY_AI_API_KEY is not set; using the built-in question bank");
    }
    let source = services.question_source(args.ai, args.language)?;
    let mut input = stdin_lines();
    let mut level = args.level;
    let mut history = AskedQuestions::new();

    loop {
        println!("\n== {} quiz, level {level}: {} ==", args.language, level.topic());
        let session = QuizSession::standalone(args.language, level).with_history(history);
        let (outcome, asked) = play_once(session, Arc::clone(&source), &mut input).await?;
        history = asked;

        let Some(outcome) = outcome else {
            break;
        };
        println!("Score: {}/{}", outcome.score, outcome.presented);
        if !outcome.passed {
            println!("Level {level} not passed. Try again!");
            break;
        }
        if level == Level::MAX {
            println!("Every level passed. Well done!");
            break;
        }

        let next = level.next();
        println!("Level {level} passed! Continue to level {next}? [y/N]");
        match input.next_line().await? {
            Some(line) if line.trim().eq_ignore_ascii_case("y") => level = next,
            _ => break,
        }
    }
    Ok(())
}

/// Drive one play-through from the terminal. Returns the outcome (if the
/// session finished) and the asked history to carry forward.
pub(crate) async fn play_once(
    session: QuizSession,
    source: Arc<dyn QuestionSource>,
    input: &mut InputLines,
) -> anyhow::Result<(Option<SessionOutcome>, AskedQuestions)> {
    let (notify_tx, mut notes) = mpsc::unbounded_channel();
    let (done_tx, mut done_rx) = oneshot::channel();
    let mut controller = QuizController::new(session, source, notify_tx).with_completion(move |outcome| {
        let _ = done_tx.send(outcome);
    });

    controller.start()?;
    println!("Loading questions...");

    while !controller.session().is_finished() {
        tokio::select! {
            Some(event) = controller.next_event(), if !controller.is_idle() => {
                apply_event(&mut controller, event);
            }
            Some(note) = notes.recv() => {
                print_notification(&note);
            }
            line = input.next_line() => {
                let Some(line) = line? else {
                    controller.abandon();
                    break;
                };
                handle_line(&mut controller, &line);
            }
        }
    }

    let outcome = done_rx.try_recv().ok();
    Ok((outcome, controller.session().asked().clone()))
}

pub(crate) fn apply_event(controller: &mut QuizController, event: QuizEvent) {
    let before = controller.phase();
    if !controller.handle_event(event) {
        return;
    }
    match (before, controller.phase()) {
        (SessionPhase::Loading, SessionPhase::AwaitingAnswer) => print_current(controller),
        (SessionPhase::AwaitingAnswer, SessionPhase::Finished) => println!("Time's up!"),
        (SessionPhase::AwaitingAnswer, SessionPhase::AwaitingAnswer) => {
            let remaining = controller.session().remaining_secs();
            if remaining <= 5 {
                println!("  {remaining}s left");
            }
        }
        _ => {}
    }
}

pub(crate) fn handle_line(controller: &mut QuizController, line: &str) {
    match line.trim() {
        "q" | "quit" => controller.abandon(),
        "r" | "retry" => {
            if let Err(err) = controller.retry() {
                println!("{err}");
            }
        }
        other => {
            let Some(option) = parse_option(other) else {
                println!("Answer with 1-4 or a-d (q to quit).");
                return;
            };
            let explanation = current_explanation(controller);
            let outcome = controller.submit_answer(option);
            report_answer(controller, outcome, explanation);
        }
    }
}

pub(crate) fn current_explanation(controller: &QuizController) -> Option<String> {
    controller
        .session()
        .current_question()
        .and_then(Question::explanation)
        .map(str::to_string)
}

pub(crate) fn report_answer(
    controller: &QuizController,
    outcome: AnswerOutcome,
    explanation: Option<String>,
) {
    match outcome {
        AnswerOutcome::Ignored => println!("Please wait for the question."),
        AnswerOutcome::Correct { finished } => {
            println!("Correct!");
            if !finished && controller.phase() == SessionPhase::AwaitingAnswer {
                print_current(controller);
            }
        }
        AnswerOutcome::Incorrect { correct_answer } => {
            println!("Wrong. The answer was {}.", LETTERS[correct_answer]);
            if let Some(explanation) = explanation {
                println!("{explanation}");
            }
        }
    }
}

pub(crate) fn print_notification(note: &Notification) {
    println!("! {note}");
    if note.is_retryable() {
        println!("Type r to retry or q to quit.");
    }
}

fn print_current(controller: &QuizController) {
    let session = controller.session();
    let Some(question) = session.current_question() else {
        return;
    };
    println!(
        "\nQuestion {}/{} [{}] ({}s)",
        session.current_index() + 1,
        session.question_count(),
        question.concept(),
        session.remaining_secs()
    );
    println!("{}", question.prompt());
    for (letter, option) in LETTERS.iter().zip(question.options()) {
        println!("  {letter}) {option}");
    }
}
