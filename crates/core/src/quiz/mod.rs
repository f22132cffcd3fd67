//! Quiz and game sessions: the timed question state machine, the asked-question
//! history used for de-duplication, the built-in question bank, and the obstacle
//! course that feeds questions to the runner game.

mod bank;
mod course;
mod history;
mod session;
mod variant;

pub use bank::{BankEntry, QuestionBank};
pub use course::{
    COLLISION_WINDOW, LANE_MAX, LANE_MIN, LANE_STEP, Move, Obstacle, ObstacleCourse,
    POINTS_PER_ANSWER, SPAWN_PROBABILITY,
};
pub use history::AskedQuestions;
pub use session::{
    AnswerOutcome, BatchOutcome, FetchGeneration, FetchTicket, QuizSession, SessionError,
    SessionOutcome, SessionPhase, TickOutcome,
};
pub use variant::{OBSTACLE_LEVEL, QuizVariant};
