//! CLI argument definitions using clap
//!
//! Commands:
//! - ruleview validate --dataset <path>
//! - ruleview report --config <path> [--support N] [--absolute X] [--relative K]
//! - ruleview session --config <path>

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// ruleview - explore how threshold filtering changes a rule-based classifier
#[derive(Parser, Debug)]
#[command(name = "ruleview")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load and validate a dataset, then print its summary
    Validate {
        /// Path to the dataset JSON file
        #[arg(long)]
        dataset: PathBuf,
    },

    /// Derive one view and print it
    Report {
        /// Path to configuration file
        #[arg(long, default_value = "./ruleview.json")]
        config: PathBuf,

        #[command(flatten)]
        thresholds: ThresholdArgs,
    },

    /// Read commands from stdin, one JSON object per line
    Session {
        /// Path to configuration file
        #[arg(long, default_value = "./ruleview.json")]
        config: PathBuf,

        #[command(flatten)]
        thresholds: ThresholdArgs,
    },
}

/// Threshold overrides; take precedence over the config file
#[derive(Args, Debug, Clone, Default)]
pub struct ThresholdArgs {
    /// Minimum rule support
    #[arg(long, allow_negative_numbers = true)]
    pub support: Option<i64>,

    /// Minimum rule confidence
    #[arg(long, allow_negative_numbers = true)]
    pub absolute: Option<f64>,

    /// Number of highest-confidence rules to keep
    #[arg(long, allow_negative_numbers = true)]
    pub relative: Option<i64>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
