//! Command-line interface definitions.
//!
//! Global options can come from flags or environment variables; each data
//! maintenance step is its own subcommand.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Clean every review-text file in ./data
/// broadway_reviews clean
///
/// # Full run against another checkout, writing nothing
/// broadway_reviews --data-dir ../site/data --dry-run pipeline
///
/// # Fail CI when the audit finds problems
/// broadway_reviews audit --strict
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Directory holding shows.json, reviews.json and review-texts/
    #[arg(short, long, global = true, env = "BROADWAY_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Optional path to a YAML tuning file
    #[arg(short, long, global = true, env = "BROADWAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Compute and log everything, write nothing
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Clean review-text files and assign content tiers
    Clean,
    /// Canonicalise outlet ids and critic names
    Normalize,
    /// Merge duplicate reviews and flag misattributions
    Dedupe,
    /// Assign review scores and aggregate show scores
    Score,
    /// Rebuild reviews.json from review-texts/
    Rebuild,
    /// Audit the outlet registry and the review set
    Audit {
        /// Exit with an error when the audit finds problems
        #[arg(long)]
        strict: bool,
    },
    /// clean, normalize, rebuild and audit in order
    Pipeline,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Clean => "clean",
            Command::Normalize => "normalize",
            Command::Dedupe => "dedupe",
            Command::Score => "score",
            Command::Rebuild => "rebuild",
            Command::Audit { .. } => "audit",
            Command::Pipeline => "pipeline",
        }
    }
}
