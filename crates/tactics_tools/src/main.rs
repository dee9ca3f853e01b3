//! Tactics development tools.
//!
//! # Usage
//!
//! ```bash
//! # Check a data directory
//! cargo run -p tactics_tools -- validate assets/data
//!
//! # Print a map, optionally after a command script
//! cargo run -p tactics_tools -- inspect assets/data/maps/prologue.ron --script assets/scripts/first_turn.jsonl
//!
//! # Drive a map from stdin, recording the inputs
//! cargo run -p tactics_tools -- run assets/data/maps/prologue.ron --record turn.rec
//!
//! # Verify a recording
//! cargo run -p tactics_tools -- replay assets/data/maps/prologue.ron turn.rec
//! ```
//!
//! Protocol output goes to stdout; logs go to stderr and honour `RUST_LOG`.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tactics_core::prelude::*;
use tactics_tools::ascii_view::{render_session, AsciiConfig};
use tactics_tools::data_loader::{DataLoadError, DataLoadResult, DataSet};
use tactics_tools::runner::{replay, HeadlessConfig, HeadlessRunner};
use tactics_tools::validate::validate_data_directory;

#[derive(Parser)]
#[command(name = "tactics-tools")]
#[command(about = "Development tools for the tactical grid core")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to data directory
    #[arg(short, long, global = true, default_value = "assets/data")]
    data: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate data files
    Validate {
        /// Path to data directory (overrides --data)
        path: Option<PathBuf>,
    },

    /// Print a map as ASCII
    Inspect {
        /// Map file
        map: PathBuf,

        /// JSON-lines command script to apply first
        #[arg(short, long)]
        script: Option<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Drive a map with JSON-lines commands on stdin
    Run {
        /// Map file
        map: PathBuf,

        /// Save the applied inputs as a recording
        #[arg(short, long)]
        record: Option<PathBuf>,
    },

    /// Replay a recording and verify its final hash
    Replay {
        /// Map file
        map: PathBuf,

        /// Recording file
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for protocol)
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let result = match cli.command {
        Commands::Validate { path } => cmd_validate(path.as_deref().unwrap_or(&cli.data)),
        Commands::Inspect {
            map,
            script,
            no_color,
        } => cmd_inspect(&cli.data, &map, script.as_deref(), no_color),
        Commands::Run { map, record } => cmd_run(&cli.data, &map, record.as_deref()),
        Commands::Replay { map, file } => cmd_replay(&cli.data, &map, &file),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn cmd_validate(path: &Path) -> DataLoadResult<ExitCode> {
    tracing::info!("Validating data files in: {}", path.display());
    let report = validate_data_directory(path)?;
    if report.is_ok() {
        tracing::info!("Validation passed");
        Ok(ExitCode::SUCCESS)
    } else {
        tracing::error!("Validation failed with {} errors", report.errors.len());
        Ok(ExitCode::FAILURE)
    }
}

fn cmd_inspect(
    data_dir: &Path,
    map: &Path,
    script: Option<&Path>,
    no_color: bool,
) -> DataLoadResult<ExitCode> {
    let data = DataSet::load(data_dir)?;
    let mut runner = HeadlessRunner::new(data.session(map)?, &HeadlessConfig::default());

    if let Some(script) = script {
        let file = File::open(script).map_err(|e| DataLoadError::IoError {
            path: script.display().to_string(),
            source: e,
        })?;
        runner.run(BufReader::new(file), io::sink())?;
        tracing::info!("Applied {} input events from {}", runner.events(), script.display());
    }

    let config = AsciiConfig {
        use_color: !no_color,
        ..AsciiConfig::default()
    };
    if let Some(text) = render_session(runner.session(), &config) {
        print!("{text}");
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_run(data_dir: &Path, map: &Path, record: Option<&Path>) -> DataLoadResult<ExitCode> {
    tracing::info!("Starting headless session on {}", map.display());
    let data = DataSet::load(data_dir)?;
    let config = HeadlessConfig {
        record: record.is_some(),
    };
    let mut runner = HeadlessRunner::new(data.session(map)?, &config);

    let stdin = io::stdin();
    runner.run(stdin.lock(), io::stdout().lock())?;

    if let (Some(path), Some(recording)) = (record, runner.finish()) {
        recording.save(path)?;
        tracing::info!(
            "Saved recording of {} events to {}",
            recording.len(),
            path.display()
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_replay(data_dir: &Path, map: &Path, file: &Path) -> DataLoadResult<ExitCode> {
    let data = DataSet::load(data_dir)?;
    let mut session = data.session(map)?;
    let recording = InputRecording::load(file)?;

    match replay(&recording, &mut session) {
        Ok(hash) => {
            println!("{hash:#018x}");
            Ok(ExitCode::SUCCESS)
        }
        Err(DataLoadError::Core(TacticsError::PlaybackDiverged { recorded, replayed })) => {
            tracing::error!("Replay diverged: recorded {recorded:#018x}, replayed {replayed:#018x}");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e),
    }
}
