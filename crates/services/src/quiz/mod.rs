//! Async driver around the pure `QuizSession` state machine.

mod controller;
mod runner;
mod timer;

pub use controller::{CompletionCallback, Notification, QuizController, QuizEvent};
pub use runner::RunnerGame;
pub use timer::CountdownTimer;
