//! One play-through of a puzzle.
//!
//! A session turns world rotations into releases, keeps the ball's resting
//! position between them, and decides when the game is won or lost.

use glam::{Mat3, Vec3};
use serde::{Deserialize, Serialize};

use crate::geometry::{cell_position, Direction};
use crate::puzzle::{Cell, Puzzle};
use crate::release::{Outcome, Release, ReleaseConfig};

/// Game lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the player to start.
    Ready,
    Playing,
    Won,
    Lost,
}

/// Where a finished release left the ball.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub direction: Direction,
    pub position: Cell,
    /// Seconds the release took.
    pub elapsed: f32,
}

/// The releases of a game, in play order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub moves: Vec<Snapshot>,
}

impl Solution {
    /// Total falling time across all releases.
    pub fn elapsed(&self) -> f32 {
        self.moves.iter().map(|snapshot| snapshot.elapsed).sum()
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    puzzle: Puzzle,
    config: ReleaseConfig,
    phase: Phase,
    player: Vec3,
    release: Option<Release>,
    solution: Option<Solution>,
}

impl Session {
    pub fn new(puzzle: Puzzle, config: ReleaseConfig) -> Self {
        let player = cell_position(puzzle.player());
        Self {
            puzzle,
            config,
            phase: Phase::Ready,
            player,
            release: None,
            solution: None,
        }
    }

    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Continuous ball position.
    pub fn player(&self) -> Vec3 {
        self.player
    }

    pub fn is_releasing(&self) -> bool {
        self.release.is_some()
    }

    /// Recorded moves; discarded when the game is lost.
    pub fn solution(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }

    /// Puts the ball back on its starting cell and waits for a new start.
    pub fn reset(&mut self) {
        self.phase = Phase::Ready;
        self.player = cell_position(self.puzzle.player());
        self.release = None;
        self.solution = None;
    }

    pub fn start(&mut self) {
        if self.phase == Phase::Ready {
            self.phase = Phase::Playing;
            self.solution = Some(Solution::default());
        }
    }

    /// Drops the ball with the world turned by `rotation`.
    ///
    /// Ignored unless playing with the ball at rest. Returns the direction
    /// the ball falls in.
    pub fn release(&mut self, rotation: &Mat3) -> Option<Direction> {
        if self.phase != Phase::Playing || self.release.is_some() {
            return None;
        }

        let release = Release::new(&self.puzzle, rotation, self.player, &self.config);
        let direction = release.direction();
        self.release = Some(release);
        Some(direction)
    }

    /// Advances the release in flight to `elapsed` seconds after it started.
    pub fn tick(&mut self, elapsed: f32) -> Phase {
        let Some(release) = self.release.as_mut() else {
            return self.phase;
        };

        let outcome = release.advance(elapsed);
        self.player = release.player();

        if let Some(position) = outcome.cell() {
            let direction = release.direction();
            self.release = None;
            if let Some(solution) = self.solution.as_mut() {
                solution.moves.push(Snapshot {
                    direction,
                    position,
                    elapsed,
                });
            }
        }

        match outcome {
            Outcome::ReachedGoal(_) => self.phase = Phase::Won,
            Outcome::OutOfBounds(_) => self.lose(),
            _ if self.escaped() => self.lose(),
            _ => {}
        }

        self.phase
    }

    /// Whether the ball has left the cube, even mid-fall.
    fn escaped(&self) -> bool {
        self.player.abs().max_element() > self.puzzle.size() as f32
    }

    fn lose(&mut self) {
        self.phase = Phase::Lost;
        self.release = None;
        self.solution = None;
    }
}
