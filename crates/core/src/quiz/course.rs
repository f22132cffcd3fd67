//! Runner-game track. Positions are percentages of the track: obstacles enter
//! at 100 and move toward the runner at the left edge.

use std::ops::RangeInclusive;

pub const LANE_MIN: i32 = 20;
pub const LANE_MAX: i32 = 80;
pub const LANE_STEP: i32 = 10;
pub const SPAWN_PROBABILITY: f64 = 0.04;
pub const POINTS_PER_ANSWER: u32 = 10;

/// Exclusive bounds of the strip where an obstacle reaches the runner.
pub const COLLISION_WINDOW: (i32, i32) = (5, 15);

const SPAWN_POSITION: i32 = 100;
const OBSTACLE_SPEED: i32 = 3;
const DESPAWN_BELOW: i32 = -10;
const LANE_START: i32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Obstacle {
    pub id: u64,
    pub position: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObstacleCourse {
    player: i32,
    obstacles: Vec<Obstacle>,
    spawned: u64,
    frozen: bool,
}

impl ObstacleCourse {
    #[must_use]
    pub fn new() -> Self {
        Self {
            player: LANE_START,
            obstacles: Vec::new(),
            spawned: 0,
            frozen: false,
        }
    }

    #[must_use]
    pub fn lanes() -> RangeInclusive<i32> {
        LANE_MIN..=LANE_MAX
    }

    /// Whether a uniform roll in `[0, 1)` spawns an obstacle this frame.
    #[must_use]
    pub fn should_spawn(roll: f64) -> bool {
        roll > 1.0 - SPAWN_PROBABILITY
    }

    /// Stop the track while a question is on screen or the run is over.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn resume(&mut self) {
        self.frozen = false;
    }

    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Move the runner one step; returns `false` when blocked or frozen.
    pub fn move_player(&mut self, direction: Move) -> bool {
        if self.frozen {
            return false;
        }
        let target = match direction {
            Move::Up => self.player - LANE_STEP,
            Move::Down => self.player + LANE_STEP,
        };
        if Self::lanes().contains(&target) {
            self.player = target;
            true
        } else {
            false
        }
    }

    /// Advance one frame. Returns the obstacle that reached the runner, which
    /// is removed from the track and freezes it until `resume`.
    pub fn step(&mut self, spawn: bool) -> Option<Obstacle> {
        if self.frozen {
            return None;
        }

        for obstacle in &mut self.obstacles {
            obstacle.position -= OBSTACLE_SPEED;
        }
        self.obstacles.retain(|o| o.position > DESPAWN_BELOW);

        if spawn {
            self.spawned += 1;
            self.obstacles.push(Obstacle {
                id: self.spawned,
                position: SPAWN_POSITION,
            });
        }

        let (low, high) = COLLISION_WINDOW;
        let hit = self
            .obstacles
            .iter()
            .position(|o| o.position > low && o.position < high)?;
        let obstacle = self.obstacles.remove(hit);
        self.frozen = true;
        Some(obstacle)
    }

    #[must_use]
    pub fn player_position(&self) -> i32 {
        self.player
    }

    #[must_use]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    #[must_use]
    pub fn points(score: u32) -> u32 {
        score.saturating_mul(POINTS_PER_ANSWER)
    }
}

impl Default for ObstacleCourse {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runner_stays_within_lanes() {
        let mut course = ObstacleCourse::new();
        for _ in 0..3 {
            assert!(course.move_player(Move::Up));
        }
        assert_eq!(course.player_position(), 20);
        assert!(!course.move_player(Move::Up));
        for _ in 0..6 {
            course.move_player(Move::Down);
        }
        assert_eq!(course.player_position(), 80);
    }

    #[test]
    fn obstacle_reaches_runner_after_enough_frames() {
        let mut course = ObstacleCourse::new();
        assert_eq!(course.step(true), None);
        let mut frames = 0;
        let hit = loop {
            frames += 1;
            if let Some(hit) = course.step(false) {
                break hit;
            }
            assert!(frames < 100, "obstacle never arrived");
        };
        assert_eq!(hit.id, 1);
        assert!(course.obstacles().is_empty());
        assert!(course.is_frozen());
        assert!(!course.move_player(Move::Down));
        assert_eq!(course.step(true), None);

        course.resume();
        assert!(course.move_player(Move::Down));
    }

    #[test]
    fn spawn_roll_matches_probability() {
        assert!(!ObstacleCourse::should_spawn(0.5));
        assert!(ObstacleCourse::should_spawn(0.97));
        assert_eq!(ObstacleCourse::points(3), 30);
    }
}
