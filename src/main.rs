//! # Broadway Reviews
//!
//! Maintenance pipeline for a flat-file Broadway review dataset: cleans
//! scraped review text, canonicalises outlet and critic names, merges
//! duplicate reviews, assigns normalized 0–100 scores and audits the result.
//!
//! ## Usage
//!
//! ```sh
//! broadway_reviews --data-dir ./data pipeline
//! broadway_reviews audit --strict
//! ```
//!
//! ## Architecture
//!
//! Every subcommand is one pass over the JSON files in the data directory:
//! 1. **Clean**: strip markup and site chrome, classify content quality
//! 2. **Normalize**: resolve outlet aliases, tidy critic bylines
//! 3. **Dedupe**: merge repeated reviews, flag misattributed ones
//! 4. **Score**: map published ratings, thumbs and cue words to 0–100
//! 5. **Audit**: report registry and review inconsistencies

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod audit;
mod cli;
mod config;
mod dedupe;
mod error;
mod models;
mod normalization;
mod outputs;
mod pipeline;
mod quality;
mod scoring;
mod store;
mod text;
mod utils;

use cli::Cli;
use config::load_config;
use pipeline::Context;
use store::DataDir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("broadway_reviews starting up");

    let args = Cli::parse();
    debug!(data_dir = %args.data_dir.display(), config = ?args.config, command = ?args.command, "Parsed CLI arguments");

    let config = match load_config(args.config.as_deref()).await {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };
    debug!(?config, "Loaded configuration");

    let ctx = Context {
        data: DataDir::new(args.data_dir.clone()),
        config,
        dry_run: args.dry_run,
    };

    if let Err(e) = pipeline::run(&args.command, &ctx).await {
        error!(command = args.command.name(), error = %e, "Command failed");
        return Err(e);
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}
