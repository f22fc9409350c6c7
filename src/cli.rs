use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "codecmedia")]
#[command(author, version, about = "Inspect, validate and convert media files")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe a media file and display information
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a media file's size and structure
    Validate {
        /// File to validate
        #[arg(required = true)]
        file: PathBuf,

        /// Parse the whole file with its format parser
        #[arg(long)]
        strict: bool,

        /// Maximum accepted size in bytes (0 = unlimited)
        #[arg(long)]
        max_bytes: Option<u64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert a media file to another format
    Convert {
        /// Source file
        input: PathBuf,

        /// Destination file
        output: PathBuf,

        /// Target format (defaults to the output extension)
        #[arg(short, long)]
        format: Option<String>,

        /// Replace the output if it exists
        #[arg(long)]
        overwrite: bool,

        /// Encoder preset
        #[arg(long)]
        preset: Option<String>,
    },

    /// Copy the audio of a file into a directory
    ExtractAudio {
        /// Source file
        input: PathBuf,

        /// Directory to write into
        output_dir: PathBuf,

        /// Output format (must match the source)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Show or update sidecar metadata
    Metadata {
        /// Media file
        file: PathBuf,

        /// Store an entry, as key=value (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },

    /// Validate configuration file
    CheckConfig {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
