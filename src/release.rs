//! Continuous-time replay of a single ball release.
//!
//! The ball falls from rest along one axis under constant acceleration. Each
//! advance works out how far it has fallen, then re-walks the grid from the
//! starting cell with the goal, portal and block rules the scorer uses, so a
//! release ends exactly where the search says a drop ends.

use glam::{Mat3, Vec3};
use log::debug;
use serde::Serialize;

use crate::geometry::{cell_position, nearest_cell, release_direction, Direction};
use crate::grid::Obstacles;
use crate::puzzle::{Cell, Puzzle};

/// Default fall acceleration, in cells per second squared.
pub const ACCELERATION: f32 = 98.1;

/// Default travel limit as a multiple of the puzzle size; far enough that
/// the ball has left the screen.
pub const TRAVEL_FACTOR: u32 = 10;

/// Tunable constants for a [`Release`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReleaseConfig {
    pub acceleration: f32,
    pub travel_factor: u32,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            acceleration: ACCELERATION,
            travel_factor: TRAVEL_FACTOR,
        }
    }
}

/// Where a release stands after an advance.
///
/// Terminal variants carry the cell the ball came to rest in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    InProgress,
    ReachedGoal(Cell),
    StoppedAtBlock(Cell),
    OutOfBounds(Cell),
}

impl Outcome {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Outcome::InProgress)
    }

    /// The resting cell of a terminal outcome.
    pub fn cell(self) -> Option<Cell> {
        match self {
            Outcome::InProgress => None,
            Outcome::ReachedGoal(cell)
            | Outcome::StoppedAtBlock(cell)
            | Outcome::OutOfBounds(cell) => Some(cell),
        }
    }
}

/// One fall of the ball in a fixed direction.
///
/// Owns the ball position; callers read it through [`Release::player`].
///
/// A release does not check the cube bounds. A ball that falls out of the
/// cube stays [`Outcome::InProgress`] until it has walked `size ×
/// travel_factor` steps, then ends [`Outcome::OutOfBounds`]. Callers that
/// need to stop earlier compare [`Release::player`] against the puzzle size,
/// as [`crate::Session`] does.
#[derive(Debug, Clone)]
pub struct Release {
    obstacles: Obstacles,
    goal: Cell,
    /// Steps walked before the ball counts as lost.
    limit: u32,
    acceleration: f32,
    direction: Direction,
    initial: Vec3,
    player: Vec3,
    outcome: Outcome,
}

impl Release {
    /// Starts a release with the world turned by `rotation`.
    pub fn new(puzzle: &Puzzle, rotation: &Mat3, player: Vec3, config: &ReleaseConfig) -> Self {
        Self::along(puzzle, release_direction(rotation), player, config)
    }

    /// Starts a release falling in `direction`.
    pub fn along(
        puzzle: &Puzzle,
        direction: Direction,
        player: Vec3,
        config: &ReleaseConfig,
    ) -> Self {
        Self {
            obstacles: Obstacles::new(puzzle),
            goal: puzzle.goal(),
            limit: puzzle.size().saturating_mul(config.travel_factor),
            acceleration: config.acceleration,
            direction,
            initial: player,
            player,
            outcome: Outcome::InProgress,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Continuous ball position as of the last advance.
    pub fn player(&self) -> Vec3 {
        self.player
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Moves the ball to where it is `elapsed` seconds after release.
    ///
    /// Once a terminal outcome is reached it is returned unchanged by every
    /// later call.
    pub fn advance(&mut self, elapsed: f32) -> Outcome {
        if self.outcome.is_terminal() {
            return self.outcome;
        }

        // s = u*t + a*t^2/2 with u = 0
        let elapsed = elapsed.max(0.0);
        let distance = 0.5 * self.acceleration * elapsed * elapsed;
        let mut player = self.initial + self.direction.as_vec3() * distance;

        let steps = (distance as u32).saturating_add(1);
        let mut cell = nearest_cell(self.initial);

        for step in 0..steps {
            if step > self.limit {
                return self.finish(Outcome::OutOfBounds(cell));
            }

            if cell == self.goal {
                return self.finish(Outcome::ReachedGoal(cell));
            }

            // the starting cell never teleports
            if step > 0 {
                if let Some(exit) = self.obstacles.portal_exit(cell) {
                    player += cell_position(exit) - cell_position(cell);
                    cell = exit;
                }
            }

            let next = self.direction.step(cell);
            if self.obstacles.is_block(next) {
                return self.finish(Outcome::StoppedAtBlock(cell));
            }
            cell = next;
        }

        self.player = player;
        Outcome::InProgress
    }

    fn finish(&mut self, outcome: Outcome) -> Outcome {
        debug!("release {} ended: {outcome:?}", self.direction);
        if let Some(cell) = outcome.cell() {
            self.player = cell_position(cell);
        }
        self.outcome = outcome;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::rotation_toward;
    use crate::score::{score, Rotations};
    use proptest::prelude::*;

    fn fall(puzzle: &Puzzle) -> Release {
        Release::new(
            puzzle,
            &Mat3::IDENTITY,
            cell_position(puzzle.player()),
            &ReleaseConfig::default(),
        )
    }

    #[test]
    fn test_release_reaches_goal() {
        let puzzle = Puzzle::new(5, (0, 1, 0), (0, -1, 0), vec![], vec![]);
        let mut release = fall(&puzzle);

        // After 1 second, player should be in goal
        assert_eq!(release.advance(1.0), Outcome::ReachedGoal((0, -1, 0)));
        assert_eq!(release.player(), Vec3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn test_release_stops_at_block() {
        let puzzle = Puzzle::new(5, (0, 1, 0), (1, 0, 0), vec![(0, -1, 0)], vec![]);
        let mut release = fall(&puzzle);

        assert_eq!(release.advance(1.0), Outcome::StoppedAtBlock((0, 0, 0)));
        assert_eq!(release.player(), Vec3::ZERO);
    }

    #[test]
    fn test_release_passes_through_portal() {
        let puzzle = Puzzle::new(
            5,
            (0, 1, 0),
            (1, -1, 0),
            vec![],
            vec![((0, -1, 0), (1, 1, 0))],
        );
        let mut release = fall(&puzzle);

        assert_eq!(release.advance(1.0), Outcome::ReachedGoal((1, -1, 0)));
        assert_eq!(release.player(), Vec3::new(1.0, -1.0, 0.0));
    }

    #[test]
    fn test_portal_shifts_continuous_position() {
        let puzzle = Puzzle::new(
            5,
            (0, 1, 0),
            (1, -1, 0),
            vec![],
            vec![((0, -1, 0), (1, 1, 0))],
        );
        let mut release = fall(&puzzle);

        // fallen ~3.07 cells: through the portal, one short of the goal
        assert_eq!(release.advance(0.25), Outcome::InProgress);
        let expected = Vec3::new(1.0, -0.065625, 0.0);
        assert!(
            release.player().distance(expected) < 1e-4,
            "player at {:?}",
            release.player()
        );
    }

    #[test]
    fn test_release_in_progress_between_cells() {
        let puzzle = Puzzle::new(5, (0, 1, 0), (0, -3, 0), vec![], vec![]);
        let mut release = fall(&puzzle);

        assert_eq!(release.advance(0.1), Outcome::InProgress);
        assert!((release.player().y - (1.0 - 0.4905)).abs() < 1e-4);
        assert_eq!(release.outcome(), Outcome::InProgress);
    }

    #[test]
    fn test_leaving_the_cube_is_still_in_progress() {
        let puzzle = Puzzle::new(5, (0, 1, 0), (2, 2, 2), vec![], vec![]);
        let mut release = fall(&puzzle);

        // fallen ~12 cells, past the cube but short of the travel limit
        assert_eq!(release.advance(0.5), Outcome::InProgress);
        assert!(release.player().y < -5.0);
    }

    #[test]
    fn test_travel_limit_is_out_of_bounds() {
        let puzzle = Puzzle::new(5, (0, 1, 0), (2, 2, 2), vec![], vec![]);
        let mut release = fall(&puzzle);

        // limit is 50 steps; the walk gives up on step 51
        assert_eq!(release.advance(2.0), Outcome::OutOfBounds((0, -50, 0)));
        assert_eq!(release.player(), Vec3::new(0.0, -50.0, 0.0));
    }

    #[test]
    fn test_terminal_outcome_is_sticky() {
        let puzzle = Puzzle::new(5, (0, 1, 0), (0, -1, 0), vec![], vec![]);
        let mut release = fall(&puzzle);

        let outcome = release.advance(1.0);
        assert_eq!(release.advance(0.0), outcome);
        assert_eq!(release.advance(5.0), outcome);
    }

    #[test]
    fn test_rotated_world_falls_sideways() {
        let puzzle = Puzzle::new(5, (0, 0, 0), (3, 0, 0), vec![], vec![]);
        let rotation = rotation_toward(Direction::Right);
        let mut release = Release::new(
            &puzzle,
            &rotation,
            Vec3::ZERO,
            &ReleaseConfig::default(),
        );

        assert_eq!(release.direction(), Direction::Right);
        assert_eq!(release.advance(1.0), Outcome::ReachedGoal((3, 0, 0)));
    }

    proptest! {
        #[test]
        fn prop_goal_below_is_reached(
            x in -5i32..=5,
            y in -4i32..=5,
            z in -5i32..=5,
            depth in 1i32..=9,
        ) {
            let goal_y = (y - depth).max(-5);
            prop_assume!(goal_y < y);
            let puzzle = Puzzle::new(5, (x, y, z), (x, goal_y, z), vec![], vec![]);

            let mut release = fall(&puzzle);
            prop_assert_eq!(release.advance(3.0), Outcome::ReachedGoal((x, goal_y, z)));
            prop_assert_eq!(score(&puzzle).rotations, Rotations::Solved(0));
        }

        #[test]
        fn prop_straight_solution_replays(seed in any::<u64>()) {
            use rand::SeedableRng;

            let mut rng = rand_pcg::Pcg32::seed_from_u64(seed);
            let puzzle = crate::generate::generate(5, 4, 2, &mut rng).unwrap();
            let mut release = fall(&puzzle);
            let outcome = release.advance(3.0);
            if score(&puzzle).rotations == Rotations::Solved(0) {
                prop_assert_eq!(outcome, Outcome::ReachedGoal(puzzle.goal()));
            }
        }
    }
}
