use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "wcdec")]
#[command(about = "Decode captured live-room push frames into readable events")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, env = "WCDEC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decode frames from files or stdin
    Decode {
        /// Input files; reads stdin when empty or "-"
        inputs: Vec<PathBuf>,

        /// Treat input as one base64-encoded frame per line
        #[arg(short, long)]
        base64: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "pretty")]
        output: OutputFormat,

        /// Print decoder statistics to stderr when done
        #[arg(long)]
        stats: bool,

        /// Try every known schema on unrecognized method tags
        #[arg(long)]
        probe: bool,

        /// Event kinds to leave out (e.g. room_stats, like)
        #[arg(long, value_delimiter = ',')]
        ignore: Vec<String>,
    },

    /// Configuration management
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Reset configuration to defaults
        #[arg(long)]
        reset: bool,
    },

    /// List the message schemas the decoder knows
    Schema {
        /// Output format
        #[arg(short, long, value_enum, default_value = "pretty")]
        output: OutputFormat,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable, one line per event
    Pretty,
    /// One JSON object per line
    Json,
    /// Indented JSON
    JsonPretty,
}
