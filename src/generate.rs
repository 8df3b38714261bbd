//! Random puzzle generation and best-candidate search.
//!
//! Cells are sampled per axis from `0..size` shifted down by `size / 2`, so
//! even sizes lean toward negative coordinates. Each entity takes a cell no
//! other entity holds.

use log::info;
use rand::Rng;
use rustc_hash::FxHashSet;

use crate::error::{Error, Result};
use crate::grid::{key, CellKey};
use crate::puzzle::{check_size, Cell, Puzzle, MAX_SIZE};
use crate::score::{score, Score};

/// Generates a puzzle with `blocks` blocks and `portals / 2` portal pairs.
///
/// Fails instead of sampling forever when the `size^3` sampling volume
/// cannot hold every entity, and rejects sizes outside `1..=MAX_SIZE`.
pub fn generate<R: Rng>(size: u32, blocks: u32, portals: u32, rng: &mut R) -> Result<Puzzle> {
    check_size(size)?;

    let pairs = portals / 2;
    let required = 2 + u64::from(blocks) + 2 * u64::from(pairs);
    let capacity = u64::from(size).pow(3);
    if required > capacity {
        return Err(Error::Overcrowded { capacity, required });
    }

    let mut occupied = FxHashSet::default();
    occupied.reserve(required as usize);

    let player = generate_location(&mut occupied, size, rng);
    let goal = generate_location(&mut occupied, size, rng);

    let mut block_cells = Vec::with_capacity(blocks as usize);
    for _ in 0..blocks {
        block_cells.push(generate_location(&mut occupied, size, rng));
    }

    let mut portal_pairs = Vec::with_capacity(pairs as usize);
    for _ in 0..pairs {
        let entry = generate_location(&mut occupied, size, rng);
        let exit = generate_location(&mut occupied, size, rng);
        portal_pairs.push((entry, exit));
    }

    Ok(Puzzle::new(size, player, goal, block_cells, portal_pairs))
}

/// Samples cells until one is free, then marks it occupied.
pub fn generate_location<R: Rng>(occupied: &mut FxHashSet<CellKey>, size: u32, rng: &mut R) -> Cell {
    loop {
        let x = random_location(size, rng);
        let y = random_location(size, rng);
        let z = random_location(size, rng);
        if occupied.insert(key((x, y, z))) {
            return (x, y, z);
        }
    }
}

/// One coordinate in `-size/2 ..= size - 1 - size/2`.
///
/// Sizes past [`MAX_SIZE`] sample as `MAX_SIZE`; a size of zero yields zero.
pub fn random_location<R: Rng>(size: u32, rng: &mut R) -> i32 {
    let size = size.clamp(1, MAX_SIZE) as i32;
    rng.random_range(0..size) - size / 2
}

/// Parameters for [`search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub size: u32,
    pub blocks: u32,
    pub portals: u32,
    /// Rotation count at which the search stops.
    pub rotations: u32,
    /// Highest penalty a candidate may carry.
    pub penalties: u32,
    pub max_tries: u64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            size: 5,
            blocks: 4,
            portals: 2,
            rotations: 1,
            penalties: u32::MAX,
            max_tries: 1_000_000_000,
        }
    }
}

/// A generated puzzle that beat every earlier try.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub puzzle: Puzzle,
    pub score: Score,
    /// Zero-based try that produced the puzzle.
    pub iteration: u64,
}

/// Generates and scores puzzles, keeping the one needing the most rotations.
///
/// Only solvable puzzles within the penalty ceiling qualify, and each must
/// beat the best so far, which starts at half the target. Stops at the
/// target or after `max_tries`.
pub fn search<R: Rng>(options: &SearchOptions, rng: &mut R) -> Result<Option<Candidate>> {
    let mut best = options.rotations / 2;
    let mut candidate = None;

    let mut iteration = 0;
    while iteration < options.max_tries && best < options.rotations {
        let puzzle = generate(options.size, options.blocks, options.portals, rng)?;
        let result = score(&puzzle);

        if let Some(rotations) = result.rotations.count() {
            if rotations > best && result.penalty <= options.penalties {
                info!(
                    "iteration {iteration}: {rotations}/{} rotations, {} penalties",
                    options.rotations, result.penalty
                );
                best = rotations;
                candidate = Some(Candidate {
                    puzzle,
                    score: result,
                    iteration,
                });
            }
        }
        iteration += 1;
    }

    Ok(candidate)
}
