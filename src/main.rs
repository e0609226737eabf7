//! card-scanner - replay recorded OCR frames through a scan session
//!
//! Each line of the input file is one frame: a JSON array of
//! `{"text": ..., "confidence": ...}` observations.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use card_scanner::config::{self, ScannerConfig};
use card_scanner::{ObservedFrame, ScanWorker, TextObservation};

/// card-scanner - payment card extraction from OCR frames
#[derive(Parser, Debug)]
#[command(name = "card-scanner")]
#[command(about = "Extracts card number, expiry and holder name from recorded OCR frames")]
struct Args {
    /// Configuration file (defaults to config.toml in the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Feed a JSON-lines frame recording through a scan session
    Replay {
        /// Recording to replay
        file: PathBuf,
    },
    /// Print the effective configuration as TOML
    PrintConfig,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_or_default_config(args.config.as_deref())?;

    match args.command {
        Command::Replay { file } => replay(&file, &config),
        Command::PrintConfig => {
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

/// Load configuration from an explicit path, the user config dir, or defaults
fn load_or_default_config(path: Option<&Path>) -> Result<ScannerConfig> {
    if let Some(path) = path {
        let config = config::load_config(path)?;
        info!("Loaded configuration from {:?}", path);
        return Ok(config);
    }

    if let Ok(config_dir) = config::config_dir() {
        let config_path = config_dir.join("config.toml");
        if config_path.exists() {
            match config::load_config(&config_path) {
                Ok(config) => {
                    info!("Loaded configuration from {:?}", config_path);
                    return Ok(config);
                }
                Err(e) => warn!("Ignoring {:?}: {:#}", config_path, e),
            }
        }
    }

    info!("Using default configuration");
    Ok(ScannerConfig::default())
}

/// Replay a recording and print the result
fn replay(path: &Path, config: &ScannerConfig) -> Result<()> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut worker = ScanWorker::spawn(config)?;

    let mut frames = 0usize;
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let observations: Vec<TextObservation> = serde_json::from_str(&line)
            .with_context(|| format!("Invalid frame on line {}", index + 1))?;
        worker.submit_frame(ObservedFrame::new(observations))?;
        frames += 1;
    }

    worker.shutdown();
    let status = worker.status();
    match worker.try_result() {
        Some(record) => {
            info!("Card found after replaying {} frames", frames);
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        None => {
            info!(
                "No card found in {} frames (number seen: {})",
                frames, status.number_seen
            );
            println!("No card found");
        }
    }

    Ok(())
}
