//! Puzzle model and its interchange record.
//!
//! A puzzle is built once, by the generator or by decoding a file, and is
//! only read afterwards. The scorer and the release simulator keep their own
//! working state and never mutate it.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};
use crate::grid::key;

/// An integer grid location.
pub type Cell = (i32, i32, i32);

/// Largest supported half-extent.
///
/// A release may walk ten sizes past the cube; this keeps every cell it
/// visits inside the lossless range of [`crate::grid::key`].
pub const MAX_SIZE: u32 = 1 << 16;

/// A single puzzle instance.
///
/// Serializes through [`PuzzleRecord`], the flat JSON layout shared with the
/// generator, scorer and players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PuzzleRecord", into = "PuzzleRecord")]
pub struct Puzzle {
    size: u32,
    player: Cell,
    goal: Cell,
    blocks: Vec<Cell>,
    portals: Vec<(Cell, Cell)>,
}

impl Puzzle {
    /// Builds a puzzle without checking it; see [`Puzzle::validate`].
    pub fn new(
        size: u32,
        player: Cell,
        goal: Cell,
        blocks: Vec<Cell>,
        portals: Vec<(Cell, Cell)>,
    ) -> Self {
        Self {
            size,
            player,
            goal,
            blocks,
            portals,
        }
    }

    /// Half-extent of the cube.
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn player(&self) -> Cell {
        self.player
    }

    pub fn goal(&self) -> Cell {
        self.goal
    }

    pub fn blocks(&self) -> &[Cell] {
        &self.blocks
    }

    /// Teleport pairs; entering either end exits at the other.
    pub fn portals(&self) -> &[(Cell, Cell)] {
        &self.portals
    }

    /// Iterates every portal endpoint, pair by pair.
    pub fn portal_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.portals.iter().flat_map(|&(a, b)| [a, b])
    }

    /// Returns true if every coordinate magnitude is within `size`.
    #[inline]
    pub fn contains(&self, (x, y, z): Cell) -> bool {
        x.unsigned_abs() <= self.size
            && y.unsigned_abs() <= self.size
            && z.unsigned_abs() <= self.size
    }

    /// Checks the size range and that no two entities share a cell.
    pub fn validate(&self) -> Result<()> {
        check_size(self.size)?;

        let mut occupied = FxHashSet::default();
        let entities = [self.player, self.goal]
            .into_iter()
            .chain(self.blocks.iter().copied())
            .chain(self.portal_cells());
        for cell in entities {
            if !occupied.insert(key(cell)) {
                let (x, y, z) = cell;
                return Err(Error::InvalidPuzzle(format!(
                    "cell ({x}, {y}, {z}) is occupied twice"
                )));
            }
        }
        Ok(())
    }
}

/// Rejects sizes outside `1..=MAX_SIZE`.
pub fn check_size(size: u32) -> Result<()> {
    if size == 0 {
        return Err(Error::InvalidPuzzle("size must be at least 1".into()));
    }
    if size > MAX_SIZE {
        return Err(Error::InvalidPuzzle(format!(
            "size {size} exceeds the maximum of {MAX_SIZE}"
        )));
    }
    Ok(())
}

/// Flat interchange layout of a puzzle.
///
/// `blocks` is a coordinate list grouped in threes and `portals` groups in
/// sixes, one pair per group. Empty lists may be written as `null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PuzzleRecord {
    pub size: u32,
    pub player: [i32; 3],
    pub goal: [i32; 3],
    #[serde(default, deserialize_with = "nullable")]
    pub blocks: Vec<i32>,
    #[serde(default, deserialize_with = "nullable")]
    pub portals: Vec<i32>,
}

fn nullable<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Vec<i32>, D::Error> {
    Ok(Option::<Vec<i32>>::deserialize(deserializer)?.unwrap_or_default())
}

fn to_cell([x, y, z]: [i32; 3]) -> Cell {
    (x, y, z)
}

fn cells(flat: &[i32]) -> impl Iterator<Item = Cell> + '_ {
    flat.chunks_exact(3).map(|c| (c[0], c[1], c[2]))
}

impl TryFrom<PuzzleRecord> for Puzzle {
    type Error = Error;

    fn try_from(record: PuzzleRecord) -> Result<Self> {
        if record.blocks.len() % 3 != 0 {
            return Err(Error::InvalidPuzzle(format!(
                "blocks has {} coordinates, expected a multiple of 3",
                record.blocks.len()
            )));
        }
        if record.portals.len() % 6 != 0 {
            return Err(Error::InvalidPuzzle(format!(
                "portals has {} coordinates, expected a multiple of 6",
                record.portals.len()
            )));
        }

        let blocks = cells(&record.blocks).collect();
        let ends: Vec<Cell> = cells(&record.portals).collect();
        let portals = ends.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect();

        let puzzle = Puzzle::new(
            record.size,
            to_cell(record.player),
            to_cell(record.goal),
            blocks,
            portals,
        );
        puzzle.validate()?;
        Ok(puzzle)
    }
}

impl From<Puzzle> for PuzzleRecord {
    fn from(puzzle: Puzzle) -> Self {
        let flatten = |(x, y, z): Cell| [x, y, z];
        Self {
            size: puzzle.size,
            player: flatten(puzzle.player),
            goal: flatten(puzzle.goal),
            blocks: puzzle.blocks.iter().copied().flat_map(flatten).collect(),
            portals: puzzle.portal_cells().flat_map(flatten).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_flat_record() {
        let json = r#"{"size":5,"player":[0,1,0],"goal":[0,-1,0],
            "blocks":[2,2,2,-1,0,1],"portals":[0,-2,0,1,1,0]}"#;
        let puzzle: Puzzle = serde_json::from_str(json).unwrap();

        assert_eq!(puzzle.size(), 5);
        assert_eq!(puzzle.player(), (0, 1, 0));
        assert_eq!(puzzle.goal(), (0, -1, 0));
        assert_eq!(puzzle.blocks(), &[(2, 2, 2), (-1, 0, 1)]);
        assert_eq!(puzzle.portals(), &[((0, -2, 0), (1, 1, 0))]);
    }

    #[test]
    fn test_decode_null_lists_as_empty() {
        let json = r#"{"size":3,"player":[0,0,0],"goal":[1,1,1],"blocks":null,"portals":null}"#;
        let puzzle: Puzzle = serde_json::from_str(json).unwrap();
        assert!(puzzle.blocks().is_empty());
        assert!(puzzle.portals().is_empty());
    }

    #[test]
    fn test_encode_keeps_flat_layout() {
        let puzzle = Puzzle::new(
            4,
            (1, 2, 3),
            (-1, -2, -3),
            vec![(0, 0, 1)],
            vec![((2, 0, 0), (0, 2, 0))],
        );
        let json = serde_json::to_value(&puzzle).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "size": 4,
                "player": [1, 2, 3],
                "goal": [-1, -2, -3],
                "blocks": [0, 0, 1],
                "portals": [2, 0, 0, 0, 2, 0]
            })
        );
        let decoded: Puzzle = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, puzzle);
    }

    #[test]
    fn test_reject_ragged_lists() {
        let json = r#"{"size":3,"player":[0,0,0],"goal":[1,1,1],"blocks":[1,2]}"#;
        assert!(serde_json::from_str::<Puzzle>(json).is_err());

        let json = r#"{"size":3,"player":[0,0,0],"goal":[1,1,1],"portals":[1,1,0]}"#;
        assert!(serde_json::from_str::<Puzzle>(json).is_err());
    }

    #[test]
    fn test_validate_rejects_shared_cells() {
        let puzzle = Puzzle::new(3, (0, 0, 0), (1, 1, 1), vec![(1, 1, 1)], vec![]);
        assert!(matches!(puzzle.validate(), Err(Error::InvalidPuzzle(_))));

        let puzzle = Puzzle::new(0, (0, 0, 0), (1, 1, 1), vec![], vec![]);
        assert!(puzzle.validate().is_err());
    }

    #[test]
    fn test_size_range() {
        let largest = Puzzle::new(MAX_SIZE, (0, 0, 0), (1, 1, 1), vec![], vec![]);
        assert!(largest.validate().is_ok());

        let oversized = Puzzle::new(MAX_SIZE + 1, (0, 0, 0), (1, 1, 1), vec![], vec![]);
        assert!(matches!(oversized.validate(), Err(Error::InvalidPuzzle(_))));

        let json = r#"{"size":3000000,"player":[0,0,0],"goal":[1,1,1]}"#;
        assert!(serde_json::from_str::<Puzzle>(json).is_err());
    }

    #[test]
    fn test_contains_is_inclusive() {
        let puzzle = Puzzle::new(2, (0, 0, 0), (1, 1, 1), vec![], vec![]);
        assert!(puzzle.contains((2, -2, 2)));
        assert!(!puzzle.contains((0, 3, 0)));
        assert!(!puzzle.contains((-3, 0, 0)));
    }
}
