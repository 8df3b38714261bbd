//! Memoized search for the fewest world rotations that solve a puzzle.
//!
//! World orientation is reduced to which of the six directions is currently
//! down. From a resting cell the ball is dropped in every direction; when it
//! comes to rest against a block the search recurses from that cell, paying
//! one rotation for the turn.
//!
//! Key properties:
//! - `(cell, direction)` results are memoized for the whole search
//! - a pair under evaluation is pinned dead, so cycles of resting cells end
//! - portal reuse per walk is capped, so portal loops end

use std::fmt;

use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use crate::geometry::Direction;
use crate::grid::{key, CellKey, Obstacles};
use crate::puzzle::{Cell, Puzzle};

/// Default number of times one walk may pass through the same portal.
pub const PORTAL_REUSE_CAP: u32 = 100;

/// Tunable limits for [`score_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreConfig {
    pub portal_reuse_cap: u32,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            portal_reuse_cap: PORTAL_REUSE_CAP,
        }
    }
}

/// Minimum rotations needed, or proof that none suffice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotations {
    Solved(u32),
    Unsolvable,
}

impl Rotations {
    pub fn count(self) -> Option<u32> {
        match self {
            Rotations::Solved(count) => Some(count),
            Rotations::Unsolvable => None,
        }
    }
}

impl fmt::Display for Rotations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rotations::Solved(count) => write!(f, "{count}"),
            Rotations::Unsolvable => f.write_str("unsolvable"),
        }
    }
}

/// Grade of a puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Score {
    pub rotations: Rotations,
    /// Unvisited blocks count once, unvisited portal endpoints twice.
    pub penalty: u32,
}

/// Scores a puzzle with the default limits.
pub fn score(puzzle: &Puzzle) -> Score {
    score_with(puzzle, &ScoreConfig::default())
}

/// Scores a puzzle.
///
/// The ball starts with "down" as its fall direction. If the best first drop
/// is along another axis, aligning it costs one extra rotation.
pub fn score_with(puzzle: &Puzzle, config: &ScoreConfig) -> Score {
    let mut search = Search::new(puzzle, config);
    let (best, direction) = search.score_directions(puzzle.player(), false);

    let rotations = match best {
        None => Rotations::Unsolvable,
        Some(count) if direction != Direction::Down => Rotations::Solved(count + 1),
        Some(count) => Rotations::Solved(count),
    };

    Score {
        rotations,
        penalty: search.penalty(),
    }
}

/// Rotation count of one branch; `None` when the branch never reaches the goal.
type Branch = Option<u32>;

/// Working state owned by a single [`score_with`] call.
struct Search<'a> {
    puzzle: &'a Puzzle,
    obstacles: Obstacles,
    portal_reuse_cap: u32,
    /// Best branch per resting cell and fall direction.
    tested: FxHashMap<(CellKey, Direction), Branch>,
    /// Blocks bumped into and portals passed through anywhere in the search.
    visited: FxHashSet<CellKey>,
    /// Portal uses, one frame per walk in progress.
    usage: Vec<FxHashMap<CellKey, u32>>,
}

impl<'a> Search<'a> {
    fn new(puzzle: &'a Puzzle, config: &ScoreConfig) -> Self {
        Self {
            puzzle,
            obstacles: Obstacles::new(puzzle),
            portal_reuse_cap: config.portal_reuse_cap,
            tested: FxHashMap::default(),
            visited: FxHashSet::default(),
            usage: Vec::new(),
        }
    }

    /// Tries every direction from `position` and keeps the cheapest.
    ///
    /// Ties go to the earliest direction in [`Direction::ALL`].
    fn score_directions(&mut self, position: Cell, portaled: bool) -> (Branch, Direction) {
        let mut best: Branch = None;
        let mut best_direction = Direction::Down;

        for direction in Direction::ALL {
            let memo = (key(position), direction);
            let branch = match self.tested.get(&memo) {
                Some(&branch) => branch,
                None => {
                    // dead until evaluated, so a walk that cycles back here fails
                    self.tested.insert(memo, None);
                    let branch = self.score_direction(position, direction, portaled);
                    self.tested.insert(memo, branch);
                    branch
                }
            };

            if let Some(rotations) = branch {
                if best.map_or(true, |current| rotations < current) {
                    best = Some(rotations);
                    best_direction = direction;
                }
            }
        }

        (best, best_direction)
    }

    fn score_direction(&mut self, start: Cell, direction: Direction, portaled: bool) -> Branch {
        self.usage.push(FxHashMap::default());
        let frame = self.usage.len() - 1;
        let branch = self.walk(start, direction, portaled, frame);
        self.usage.pop();
        branch
    }

    /// Drops the ball from `start` until it leaves the grid, reaches the goal,
    /// or rests against a block.
    fn walk(&mut self, start: Cell, direction: Direction, mut portaled: bool, frame: usize) -> Branch {
        let goal = self.puzzle.goal();
        let mut player = start;
        let mut moved = false;

        loop {
            if !self.puzzle.contains(player) {
                return None;
            }
            if player == goal {
                return Some(0);
            }

            // the starting cell and a fresh portal exit never teleport
            if moved && !portaled {
                if let Some(exit) = self.obstacles.portal_exit(player) {
                    let uses = self.usage[frame].entry(key(player)).or_insert(0);
                    if *uses >= self.portal_reuse_cap {
                        debug!("portal loop at {player:?} falling {direction}");
                        return None;
                    }
                    *uses += 1;

                    self.visited.insert(key(player));
                    self.visited.insert(key(exit));
                    player = exit;
                    portaled = true;
                    continue;
                }
            }

            let next = direction.step(player);
            if self.obstacles.is_block(next) {
                self.visited.insert(key(next));
                let (best, _) = self.score_directions(player, portaled);
                return best.map(|rotations| rotations + 1);
            }

            player = next;
            portaled = false;
            moved = true;
        }
    }

    fn penalty(&self) -> u32 {
        let unvisited = |cell: &Cell| !self.visited.contains(&key(*cell));
        let blocks = self.puzzle.blocks().iter().copied().filter(unvisited).count() as u32;
        let portals = self.puzzle.portal_cells().filter(unvisited).count() as u32;
        blocks + 2 * portals
    }
}
