//! File I/O for puzzles in the JSON interchange format.
//!
//! Layout (one object per file):
//! - `size`: half-extent of the cube
//! - `player`, `goal`: `[x, y, z]`
//! - `blocks`: flat coordinates, three per block
//! - `portals`: flat coordinates, six per pair
//!
//! Empty lists may be `null`. Decoding validates the puzzle.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::info;

use crate::error::Result;
use crate::puzzle::Puzzle;

/// Loads and validates a puzzle file.
pub fn load(path: impl AsRef<Path>) -> Result<Puzzle> {
    let path = path.as_ref();
    info!("reading {}", path.display());
    from_reader(BufReader::new(File::open(path)?))
}

/// Writes a puzzle file, replacing any existing one.
pub fn save(path: impl AsRef<Path>, puzzle: &Puzzle) -> Result<()> {
    let path = path.as_ref();
    info!("writing {}", path.display());
    let mut writer = BufWriter::new(File::create(path)?);
    to_writer(&mut writer, puzzle)?;
    writer.flush()?;
    Ok(())
}

pub fn from_reader(reader: impl Read) -> Result<Puzzle> {
    Ok(serde_json::from_reader(reader)?)
}

/// Encodes a puzzle followed by a newline.
pub fn to_writer(mut writer: impl Write, puzzle: &Puzzle) -> Result<()> {
    serde_json::to_writer(&mut writer, puzzle)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_reader_accepts_encoded_puzzle() {
        let puzzle = Puzzle::new(
            5,
            (0, 1, 0),
            (1, -1, 0),
            vec![(2, 2, 2)],
            vec![((0, -1, 0), (1, 1, 0))],
        );

        let mut buffer = Vec::new();
        to_writer(&mut buffer, &puzzle).unwrap();
        assert_eq!(buffer.last(), Some(&b'\n'));

        let decoded = from_reader(buffer.as_slice()).unwrap();
        assert_eq!(decoded, puzzle);
    }

    #[test]
    fn test_reader_rejects_overlapping_entities() {
        let json = br#"{"size":5,"player":[0,0,0],"goal":[0,0,0],"blocks":[],"portals":[]}"#;
        let error = from_reader(&json[..]).unwrap_err();
        assert!(matches!(error, Error::Json(_)), "got {error}");
        assert!(error.to_string().contains("occupied twice"));
    }

    #[test]
    fn test_reader_rejects_garbage() {
        assert!(matches!(from_reader(&b"not json"[..]), Err(Error::Json(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let missing = std::env::temp_dir().join("fungo-no-such-puzzle.json");
        assert!(matches!(load(missing), Err(Error::Io(_))));
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("fungo-save-{}.json", std::process::id()));
        let puzzle = Puzzle::new(3, (0, 0, 0), (1, 1, 1), vec![(-1, 0, 1)], vec![]);

        save(&path, &puzzle).unwrap();
        let loaded = load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded, puzzle);
    }
}
