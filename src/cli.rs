use clap::Parser;
use std::path::PathBuf;

use crate::config::SplitConfig;

/// Split processed data files into train / val / test, stratified by day and night
#[derive(Parser, Debug)]
#[command(name = "create-splits", version)]
pub struct Args {
    /// Source data directory, contains the processed files
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Destination data directory, receives train / val / test sub folders
    #[arg(long)]
    pub destination: Option<PathBuf>,

    /// Statistics table (CSV or JSON) mapping filename to night flag
    #[arg(long)]
    pub statistics: Option<PathBuf>,

    /// Seed for reproducible shuffling
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log the planned split without moving any file
    #[arg(long)]
    pub dry_run: bool,

    /// JSON config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory for log files
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

impl Args {
    /// Flags given on the command line override the loaded config
    pub fn apply(&self, config: &mut SplitConfig) {
        if let Some(source) = &self.source {
            config.source = source.clone();
        }
        if let Some(destination) = &self.destination {
            config.destination = destination.clone();
        }
        if let Some(statistics) = &self.statistics {
            config.statistics_path = statistics.clone();
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if self.dry_run {
            config.dry_run = true;
        }
        if let Some(log_dir) = &self.log_dir {
            config.log_dir = log_dir.clone();
        }
    }
}
