//! Gravity Cube Puzzle CLI
//!
//! Generates, scores, prints and plays gravity-cube puzzles. Puzzles are read
//! from a file argument or stdin, and written to a file or stdout, in the
//! JSON interchange format.

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Parser, Subcommand};
use log::{error, info, warn};
use rand::SeedableRng;
use rand_pcg::Pcg32;

use fungo::generate::{self, SearchOptions};
use fungo::geometry::{nearest_cell, rotation_toward};
use fungo::grid::format_puzzle;
use fungo::{persistence, score, Direction, Phase, Puzzle, ReleaseConfig, Session};

/// Animation step used when playing from the command line.
const FRAME_SECONDS: f32 = 1.0 / 60.0;

/// Generates, grades and plays gravity-cube puzzles.
#[derive(Parser)]
#[command(name = "fungo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search random puzzles for one needing the requested rotations.
    Generate {
        /// Puzzle size.
        #[arg(long, default_value_t = 5)]
        size: u32,
        /// Minimum puzzle rotations.
        #[arg(long, default_value_t = 1)]
        rotations: u32,
        /// Maximum puzzle penalties.
        #[arg(long, default_value_t = u32::MAX)]
        penalties: u32,
        /// Number of blocks.
        #[arg(long, default_value_t = 4)]
        blocks: u32,
        /// Number of portal endpoints.
        #[arg(long, default_value_t = 2)]
        portals: u32,
        /// Random seed; taken from the clock when absent.
        #[arg(long)]
        seed: Option<u64>,
        /// Puzzles to try before giving up.
        #[arg(long, default_value_t = 1_000_000_000)]
        max_tries: u64,
        /// Output file; stdout when absent.
        output: Option<PathBuf>,
    },
    /// Print the rotations and penalties of a puzzle.
    Score {
        /// Puzzle file; stdin when absent.
        puzzle: Option<PathBuf>,
    },
    /// Print a puzzle slice by slice.
    Show {
        /// Puzzle file; stdin when absent.
        puzzle: Option<PathBuf>,
    },
    /// Release the ball once per listed direction and report where it lands.
    Play {
        /// Puzzle file; stdin when absent.
        puzzle: Option<PathBuf>,
        /// Comma-separated fall directions, e.g. `down,right`.
        #[arg(long, value_delimiter = ',', required = true)]
        moves: Vec<Direction>,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Generate {
            size,
            rotations,
            penalties,
            blocks,
            portals,
            seed,
            max_tries,
            output,
        } => {
            let options = SearchOptions {
                size,
                blocks,
                portals,
                rotations,
                penalties,
                max_tries,
            };
            run_generate(&options, seed, output.as_deref())
        }
        Command::Score { puzzle } => run_score(puzzle.as_deref()),
        Command::Show { puzzle } => run_show(puzzle.as_deref()),
        Command::Play { puzzle, moves } => run_play(puzzle.as_deref(), &moves),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Reads a puzzle from `path`, or stdin when absent.
fn read_puzzle(path: Option<&Path>) -> fungo::Result<Puzzle> {
    match path {
        Some(path) => persistence::load(path),
        None => persistence::from_reader(io::stdin().lock()),
    }
}

/// Searches for a puzzle and writes the best one found.
fn run_generate(options: &SearchOptions, seed: Option<u64>, output: Option<&Path>) -> fungo::Result<()> {
    let seed = seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos() as u64)
            .unwrap_or_default()
    });
    info!("seed: {seed}");

    let mut rng = Pcg32::seed_from_u64(seed);
    let Some(candidate) = generate::search(options, &mut rng)? else {
        warn!(
            "no puzzle beat {} rotations within {} tries",
            options.rotations / 2,
            options.max_tries
        );
        return Ok(());
    };

    info!("size: {}", options.size);
    info!("rotations: {} / {}", candidate.score.rotations, options.rotations);
    info!("penalties: {}", candidate.score.penalty);

    match output {
        Some(path) => persistence::save(path, &candidate.puzzle),
        None => persistence::to_writer(io::stdout().lock(), &candidate.puzzle),
    }
}

/// Prints the score of a puzzle.
fn run_score(path: Option<&Path>) -> fungo::Result<()> {
    let puzzle = read_puzzle(path)?;
    let result = score(&puzzle);

    println!("Rotations: {}", result.rotations);
    println!("Penalties: {}", result.penalty);
    Ok(())
}

/// Prints a puzzle as text.
fn run_show(path: Option<&Path>) -> fungo::Result<()> {
    let puzzle = read_puzzle(path)?;
    print!("{}", format_puzzle(&puzzle));
    Ok(())
}

/// Plays the listed moves and prints where each release leaves the ball.
fn run_play(path: Option<&Path>, moves: &[Direction]) -> fungo::Result<()> {
    let puzzle = read_puzzle(path)?;
    let mut session = Session::new(puzzle, ReleaseConfig::default());
    session.start();

    for line in play(&mut session, moves) {
        println!("{line}");
    }

    println!("Result: {:?}", session.phase());
    if let Some(solution) = session.solution().filter(|_| session.phase() == Phase::Won) {
        println!("Time: {:.2}s", solution.elapsed());
    }
    Ok(())
}

/// Drives a started session through `moves`, one line of report per release.
fn play(session: &mut Session, moves: &[Direction]) -> Vec<String> {
    let mut report = Vec::with_capacity(moves.len());

    for &direction in moves {
        if session.phase() != Phase::Playing {
            break;
        }
        session.release(&rotation_toward(direction));

        // the travel limit guarantees every release ends
        let mut elapsed = 0.0;
        while session.is_releasing() {
            elapsed += FRAME_SECONDS;
            session.tick(elapsed);
        }

        let (x, y, z) = nearest_cell(session.player());
        report.push(format!(
            "{direction}: ({x}, {y}, {z}) {:?}",
            session.phase()
        ));
    }

    report
}
