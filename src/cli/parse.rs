//! CLI parse: clap types for flowmerge. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Flowmerge CLI - bin-based aggregation and merge of flow units
#[derive(Parser)]
#[command(name = "flowmerge")]
#[command(about = "Merge files into bins by concatenation, tar or zip")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (config/config.toml is read from here)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Merge input files and write each merged result to the output directory
    Merge {
        /// Output directory for merged results
        #[arg(long)]
        out: PathBuf,

        /// Attribute added to every input unit
        #[arg(long = "attr", value_name = "KEY=VALUE")]
        attrs: Vec<String>,

        /// Merge option by property name, e.g. --set "Merge Format=TAR"
        #[arg(long = "set", value_name = "PROPERTY=VALUE")]
        properties: Vec<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,

        /// Input files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Validate configuration and print the resolved merge settings
    CheckConfig {
        /// Merge option by property name
        #[arg(long = "set", value_name = "PROPERTY=VALUE")]
        properties: Vec<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}
