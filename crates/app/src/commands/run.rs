use std::time::Duration;

use buddy_core::quiz::{Move, ObstacleCourse};
use services::{AppServices, RunnerGame};
use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval};
use tracing::warn;

use super::quiz::{apply_event, current_explanation, handle_line, print_notification, report_answer};
use super::{parse_option, stdin_lines};
use crate::cli::RunArgs;

const MIN_FRAME_MS: u64 = 10;

pub async fn play(services: &AppServices, args: RunArgs) -> anyhow::Result<()> {
    if args.ai && !services.ai_enabled() {
        warn!("BUDDY_AI_API_KEY is not set; using the built-in question bank");
    }
    let (notify_tx, mut notes) = mpsc::unbounded_channel();
    let source = services.question_source(args.ai, args.language)?;
    let mut game = RunnerGame::new(args.language, source, notify_tx);
    let mut input = stdin_lines();
    let mut frames = interval(Duration::from_millis(args.frame_ms.max(MIN_FRAME_MS)));
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    println!("{} runner: w/s to move, answer with 1-4 when you hit an obstacle, q to quit.", args.language);

    while !game.is_over() {
        tokio::select! {
            _ = frames.tick() => {
                if let Some(hit) = game.frame(rand::random::<f64>())? {
                    println!("Obstacle #{} hit! Answer to keep running.", hit.id);
                }
            }
            Some(event) = game.controller_mut().next_event(), if !game.controller().is_idle() => {
                apply_event(game.controller_mut(), event);
            }
            Some(note) = notes.recv() => {
                print_notification(&note);
            }
            line = input.next_line() => {
                let Some(line) = line? else {
                    game.abandon();
                    break;
                };
                match line.trim() {
                    "w" | "up" => print_lane(game.move_player(Move::Up), game.course()),
                    "s" | "down" => print_lane(game.move_player(Move::Down), game.course()),
                    "q" | "quit" => game.abandon(),
                    other => match parse_option(other) {
                        Some(option) => {
                            let explanation = current_explanation(game.controller());
                            let outcome = game.submit_answer(option);
                            report_answer(game.controller(), outcome, explanation);
                        }
                        None => handle_line(game.controller_mut(), other),
                    },
                }
            }
        }
    }

    while let Ok(note) = notes.try_recv() {
        print_notification(&note);
    }
    println!("Game over! {} points.", game.points());
    Ok(())
}

fn print_lane(moved: bool, course: &ObstacleCourse) {
    if moved {
        println!("lane {}", course.player_position());
    }
}
