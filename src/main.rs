use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info, warn};

mod cli;
mod config;
mod core;
mod logging;
mod splitter;

use cli::Args;
use config::SplitConfig;
use crate::core::operations::RelocationError;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let (mut config, config_path) =
        SplitConfig::load(args.config.as_deref()).context("failed to load config")?;
    args.apply(&mut config);

    logging::setup_logging(&config.log_dir)?;

    match &config_path {
        Some(path) => info!("Loaded config from: {:?}", path),
        None => info!("No config file found, using defaults"),
    }

    info!("Creating splits...");
    info!(
        "Source: {:?}, destination: {:?}, statistics: {:?}",
        config.source, config.destination, config.statistics_path
    );

    let mut rng = match config.seed {
        Some(seed) => {
            info!("Using seed {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    let outcome = splitter::run_split(&config, &mut rng).inspect_err(|e| error!("{}", e))?;

    if outcome.assignment.is_empty() {
        warn!("Statistics table listed no files, nothing to split");
    }

    let summary = &outcome.summary;
    // A halted relocation has already been logged; it does not change the exit code
    match outcome.relocation.as_ref().map(|report| (report, &report.error)) {
        None => info!(
            "Dry run finished: train={} val={} test={}",
            summary.train, summary.val, summary.test
        ),
        Some((report, None)) => info!(
            "Done: {} of {} files moved (train={} val={} test={})",
            report.moved, report.planned, summary.train, summary.val, summary.test
        ),
        Some((_, Some(RelocationError::MissingSources { .. }))) => {
            warn!("No files were moved; rerun once the source directory is complete")
        }
        Some((report, Some(_))) => warn!(
            "Stopped after {} of {} files; moved files were not rolled back",
            report.moved, report.planned
        ),
    }

    Ok(())
}
