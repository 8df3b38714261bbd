//! Gravity Cube Puzzle Engine
//!
//! A ball sits in a cube of cells holding blocks and portal pairs. Gravity
//! always pulls "down"; the player turns the world to choose which way the
//! ball falls, aiming for the goal cell.
//!
//! Core modules:
//! - `score`: memoized search for the fewest rotations that solve a puzzle
//! - `release`: continuous-time replay of one fall, same movement rules
//! - `generate`: random puzzles and best-candidate search
//! - `session`: one play-through built from releases

pub mod error;
pub mod generate;
pub mod geometry;
pub mod grid;
pub mod persistence;
pub mod puzzle;
pub mod release;
pub mod score;
pub mod session;

pub use error::{Error, Result};
pub use geometry::Direction;
pub use puzzle::{Cell, Puzzle};
pub use release::{Outcome, Release, ReleaseConfig};
pub use score::{score, score_with, Rotations, Score, ScoreConfig};
pub use session::{Phase, Session, Solution};
