use rand::Rng;
use thiserror::Error;
use tracing::{info, info_span, warn};

use crate::config::{ConfigError, SplitConfig};
use crate::core::analysis::{allocate_splits, SplitAssignment, SplitSummary};
use crate::core::dataset::{load_statistics, Record, StatisticsError};
use crate::core::operations::{relocate, RelocationPlan, RelocationReport};

/// Failures that stop a run before any file is touched
#[derive(Debug, Error)]
pub enum SplitError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Statistics(#[from] StatisticsError),
}

/// Everything a run produced
#[derive(Debug)]
pub struct SplitOutcome {
    pub assignment: SplitAssignment,
    pub summary: SplitSummary,
    /// `None` for dry runs
    pub relocation: Option<RelocationReport>,
}

/// Read the statistics table named in `config` and split its files.
pub fn run_split<R: Rng + ?Sized>(
    config: &SplitConfig,
    rng: &mut R,
) -> Result<SplitOutcome, SplitError> {
    let records = load_statistics(&config.statistics_path)?;
    split_records(&records, config, rng)
}

/// Allocate `records` to train/val/test and move the files into place.
///
/// All logging of the run happens inside a `split` span carrying the source
/// and destination. Relocation problems are logged and reported in the
/// outcome, not returned as errors.
pub fn split_records<R: Rng + ?Sized>(
    records: &[Record],
    config: &SplitConfig,
    rng: &mut R,
) -> Result<SplitOutcome, SplitError> {
    let span = info_span!(
        "split",
        source = %config.source.display(),
        destination = %config.destination.display()
    );
    let _guard = span.enter();

    let ratios = config.ratios()?;
    info!(
        "Ratios - train: {:.2}, val: {:.2}, test: {:.2}",
        ratios.train(),
        ratios.val,
        ratios.test
    );

    info!("Found {} data files.", records.len());

    let assignment = allocate_splits(records, &ratios, rng);
    let summary = SplitSummary::new(&assignment);
    summary.log();

    let plan = RelocationPlan::new(&config.source, &config.destination, &assignment);

    if config.dry_run {
        info!(
            "Dry run: {} moves planned into {:?}, no files touched",
            plan.len(),
            plan.destination
        );
        for action in &plan.actions {
            info!("{:?} -> {:?}", action.source_path, action.destination_path);
        }
        return Ok(SplitOutcome {
            assignment,
            summary,
            relocation: None,
        });
    }

    let report = relocate(&plan);
    if !report.is_complete() {
        warn!(
            "Relocation incomplete: {} of {} files moved",
            report.moved, report.planned
        );
    }

    Ok(SplitOutcome {
        assignment,
        summary,
        relocation: Some(report),
    })
}
