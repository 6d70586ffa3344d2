//! CLI entry point for the safe solver.
//!
//! Usage:
//!   backtracker solve <safe.txt> [options]
//!   backtracker solve --stdin [options]
//!   backtracker verify <safe.txt>
//!
//! Options:
//!   --mode <first|all|route>  What to search for (default: first)
//!   --limit <n>               Maximum solutions printed in `all` mode (default: 10)
//!   --debug                   Trace every configuration examined
//!   --verbose                 Log search summaries

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{info, LevelFilter, Metadata, Record};
use serde::Serialize;

use backtracker::{Backtracker, Safe, SafeConfig, SearchStats};

#[derive(Parser)]
#[command(name = "backtracker")]
#[command(about = "Recursive backtracking solver for laser safe puzzles")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Trace every configuration the solver examines
    #[arg(long, global = true)]
    debug: bool,

    /// Log search summaries
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for a laser placement that solves the safe
    Solve {
        /// Path to a safe file (text or .json; use --stdin to read from stdin)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Read the safe from stdin instead of a file
        #[arg(long)]
        stdin: bool,

        /// What to search for
        #[arg(long, value_enum, default_value_t = Mode::First)]
        mode: Mode,

        /// Maximum number of solutions printed in `all` mode
        #[arg(
            long,
            default_value = "10",
            value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
        )]
        limit: usize,
    },
    /// Check a safe whose lasers are already placed
    Verify {
        /// Path to a safe file
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Read the safe from stdin instead of a file
        #[arg(long)]
        stdin: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// The first solution found
    First,
    /// Every solution reachable from the initial safe
    All,
    /// The first solution and every configuration on the way to it
    Route,
}

/// Output format for a search
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SolveOutput {
    solved: bool,
    configurations_examined: usize,
    pruned: usize,
    dead_ends: usize,
    goals: usize,
    max_depth: usize,
    time_elapsed_ms: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    solutions: Vec<Vec<String>>,
}

/// Output format for verification
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyOutput {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

/// Minimal stderr sink for the `log` facade
struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logging(debug: bool, verbose: bool) {
    let level = if debug {
        LevelFilter::Debug
    } else if verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug, cli.verbose);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Run a command, returning whether it succeeded
fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Commands::Solve {
            file,
            stdin,
            mode,
            limit,
        } => {
            let safe = read_safe(file, stdin)?;
            let output = solve(safe, mode, limit, cli.debug);
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(output.solved)
        }
        Commands::Verify { file, stdin } => {
            let safe = read_safe(file, stdin)?;
            let output = verify(&safe);
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(output.valid)
        }
    }
}

fn read_safe(file: Option<PathBuf>, stdin: bool) -> Result<Safe> {
    if stdin {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read from stdin")?;
        Ok(Safe::parse(&buffer)?)
    } else if let Some(path) = file {
        Safe::load(&path).with_context(|| format!("failed to load safe {}", path.display()))
    } else {
        bail!("must provide either a file path or --stdin");
    }
}

fn solve(safe: Safe, mode: Mode, limit: usize, debug: bool) -> SolveOutput {
    info!("solving {}x{} safe ({:?} mode)", safe.rows(), safe.cols(), mode);
    let root = SafeConfig::new(safe);
    let engine = Backtracker::new(debug);

    let (solutions, stats) = match mode {
        Mode::First => {
            let outcome = engine.search(root);
            (outcome.solution.map(|s| vec![s]), outcome.stats)
        }
        Mode::All => {
            let outcome = engine.search_all(root);
            let goals = outcome
                .solution
                .filter(|goals| !goals.is_empty())
                .map(|goals| goals.into_iter().take(limit).collect());
            (goals, outcome.stats)
        }
        Mode::Route => {
            let outcome = engine.search_route(root);
            (outcome.solution, outcome.stats)
        }
    };

    format_result(solutions, &stats)
}

fn format_result(solutions: Option<Vec<SafeConfig>>, stats: &SearchStats) -> SolveOutput {
    info!(
        "examined {} configurations, pruned {}, {} dead ends",
        stats.examined, stats.pruned, stats.dead_ends
    );
    SolveOutput {
        solved: solutions.is_some(),
        configurations_examined: stats.examined,
        pruned: stats.pruned,
        dead_ends: stats.dead_ends,
        goals: stats.goals,
        max_depth: stats.max_depth,
        time_elapsed_ms: stats.elapsed.as_millis() as u64,
        solutions: solutions
            .unwrap_or_default()
            .iter()
            .map(SafeConfig::render_rows)
            .collect(),
    }
}

fn verify(safe: &Safe) -> VerifyOutput {
    match backtracker::verify(safe, &safe.lasers()) {
        Ok(()) => VerifyOutput {
            valid: true,
            reason: None,
        },
        Err(violation) => VerifyOutput {
            valid: false,
            reason: Some(violation.to_string()),
        },
    }
}
