//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Streaming-subscription gap analyzer.
///
/// Infers whether each device's subscription is ad-supported, ad-free, or
/// ambiguous from the time gaps between its viewing sessions.
#[derive(Debug, Parser)]
#[command(name = "adgap", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the gap-analysis pipeline and export its tables per provider.
    Analyze {
        /// Path to the viewing-session CSV.
        #[arg(long)]
        input: PathBuf,

        /// Directory the result tables are written to.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Provider to analyze (repeatable); defaults to the configured list.
        #[arg(long = "service")]
        services: Vec<String>,

        /// Minimum absolute count of ad-like gaps.
        #[arg(long)]
        ad_threshold: Option<u64>,

        /// Minimum proportion of ad-like gaps.
        #[arg(long)]
        ad_frequency_threshold: Option<f64>,
    },

    /// Explore the columns of a viewing-session CSV.
    Inspect {
        /// Path to the CSV to inspect.
        #[arg(long)]
        input: PathBuf,

        /// List the distinct values of this column.
        #[arg(long)]
        column: Option<String>,

        /// Restrict the listing to values matching this word exactly,
        /// ignoring case. Requires --column.
        #[arg(long, requires = "column")]
        find: Option<String>,
    },
}
