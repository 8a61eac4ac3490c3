//! Command-line interface for offscribe
//!
//! Provides argument parsing using clap derive macros.

use crate::config::Backend;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::time::Duration;

/// Offline transcription of audio files
#[derive(Parser, Debug)]
#[command(
    name = "offscribe",
    version,
    about = "Offline transcription of audio files"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose logging (-v: debug, -vv: trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transcribe one or more audio files (16kHz mono 16-bit PCM)
    Transcribe {
        /// Audio files, transcribed in order with one loaded model
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,

        /// Model directory or file (overrides engine.model_path)
        #[arg(long, short = 'm', value_name = "PATH")]
        model: Option<PathBuf>,

        /// Engine backend: vosk or whisper ("mock" is a test backend that reads bytes as text)
        #[arg(long, short = 'b', value_name = "BACKEND", value_parser = parse_backend)]
        backend: Option<Backend>,

        /// Give up on a file after this long. Examples: 30s, 5m, 1h30m
        #[arg(long, short = 't', value_name = "DURATION", value_parser = parse_timeout)]
        timeout: Option<Duration>,

        /// Prefix each transcript with its file path and a tab
        #[arg(long)]
        with_path: bool,
    },

    /// Report whether the configured engine can run on this system
    Check {
        /// Engine backend to check: vosk or whisper (default: configured backend)
        #[arg(long, short = 'b', value_name = "BACKEND", value_parser = parse_backend)]
        backend: Option<Backend>,
    },

    /// Show the WAV header of an audio file
    Probe {
        /// Audio file to inspect
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// View configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the default configuration file path
    Path,
}

fn parse_backend(s: &str) -> Result<Backend, String> {
    s.parse().map_err(|e: crate::OffscribeError| e.to_string())
}

/// Parse a timeout string.
///
/// Supports any duration format accepted by `humantime`: bare numbers (seconds),
/// single-unit (`30s`, `5m`, `2h`), and compound (`1h30m`, `2m30s`).
fn parse_timeout(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    // Bare number → seconds
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(s).map_err(|e| e.to_string())
}
