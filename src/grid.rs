//! Cell keys, obstacle lookup, and text rendering for puzzle grids.
//!
//! Coordinates are centered: a puzzle of size `s` spans `-s..=s` on every
//! axis. Both the scorer and the release simulator move the ball through
//! [`Obstacles`], so they agree on what a block or a portal is.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::puzzle::{Cell, Puzzle};

/// Canonical packed form of a [`Cell`], used for set and map membership.
pub type CellKey = u64;

/// Bits per axis in a [`CellKey`].
const AXIS_BITS: u32 = 21;
const AXIS_MASK: u64 = (1 << AXIS_BITS) - 1;
const AXIS_BIAS: i64 = 1 << (AXIS_BITS - 1);

#[inline(always)]
const fn pack_axis(coordinate: i32) -> u64 {
    ((coordinate as i64 + AXIS_BIAS) as u64) & AXIS_MASK
}

/// Packs a cell into its key.
///
/// Lossless for coordinates in `[-2^20, 2^20)`. Puzzles up to
/// [`crate::puzzle::MAX_SIZE`] stay inside that range out to the default
/// travel limit; a larger travel factor can alias distant cells.
#[inline(always)]
pub const fn key((x, y, z): Cell) -> CellKey {
    (pack_axis(x) << (2 * AXIS_BITS)) | (pack_axis(y) << AXIS_BITS) | pack_axis(z)
}

/// Block and portal lookup for one puzzle.
#[derive(Debug, Clone, Default)]
pub struct Obstacles {
    blocks: FxHashSet<CellKey>,
    /// Each portal endpoint mapped to the cell it exits at.
    portals: FxHashMap<CellKey, Cell>,
}

impl Obstacles {
    pub fn new(puzzle: &Puzzle) -> Self {
        let blocks = puzzle.blocks().iter().map(|&cell| key(cell)).collect();

        let mut portals = FxHashMap::default();
        for &(a, b) in puzzle.portals() {
            portals.insert(key(a), b);
            portals.insert(key(b), a);
        }

        Self { blocks, portals }
    }

    #[inline]
    pub fn is_block(&self, cell: Cell) -> bool {
        self.blocks.contains(&key(cell))
    }

    /// The paired endpoint if `cell` is a portal.
    #[inline]
    pub fn portal_exit(&self, cell: Cell) -> Option<Cell> {
        self.portals.get(&key(cell)).copied()
    }
}

/// Symbol for both ends of the portal pair at `pair`.
fn portal_symbol(pair: usize) -> char {
    if pair < 26 {
        char::from(b'a' + pair as u8)
    } else {
        '*'
    }
}

/// Formats a puzzle as a human-readable string.
///
/// Prints one labelled block per z-slice, rows from top (`y = size`) to
/// bottom, columns from `x = -size` to `x = size`. `P` is the player, `G` the
/// goal, `#` a block, and lowercase letters mark portal pairs. Empty cells
/// show as '.'.
pub fn format_puzzle(puzzle: &Puzzle) -> String {
    let size = puzzle.size() as i32;

    let mut symbols: FxHashMap<CellKey, char> = FxHashMap::default();
    for &block in puzzle.blocks() {
        symbols.insert(key(block), '#');
    }
    for (pair, &(a, b)) in puzzle.portals().iter().enumerate() {
        symbols.insert(key(a), portal_symbol(pair));
        symbols.insert(key(b), portal_symbol(pair));
    }
    symbols.insert(key(puzzle.goal()), 'G');
    symbols.insert(key(puzzle.player()), 'P');

    let mut output = String::new();
    for z in -size..=size {
        if z > -size {
            output.push('\n');
        }
        output.push_str(&format!("z={z}\n"));
        for y in (-size..=size).rev() {
            for x in -size..=size {
                output.push(symbols.get(&key((x, y, z))).copied().unwrap_or('.'));
            }
            output.push('\n');
        }
    }

    output
}
