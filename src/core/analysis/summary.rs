use tracing::info;

use super::SplitAssignment;
use crate::core::dataset::DatasetSplit;

/// File counts per split after allocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitSummary {
    pub total_files: usize,
    pub train: usize,
    pub val: usize,
    pub test: usize,
}

impl SplitSummary {
    pub fn new(assignment: &SplitAssignment) -> Self {
        Self {
            total_files: assignment.total(),
            train: assignment.train.len(),
            val: assignment.val.len(),
            test: assignment.test.len(),
        }
    }

    /// Get count for a specific split
    pub fn get_count(&self, split: DatasetSplit) -> usize {
        match split {
            DatasetSplit::Train => self.train,
            DatasetSplit::Val => self.val,
            DatasetSplit::Test => self.test,
        }
    }

    /// Get percentage of all input files for a specific split
    pub fn get_percentage(&self, split: DatasetSplit) -> f64 {
        if self.total_files == 0 {
            return 0.0;
        }
        (self.get_count(split) as f64 / self.total_files as f64) * 100.0
    }

    pub fn log(&self) {
        for split in DatasetSplit::all() {
            info!(
                "Took {} files for {} dataset ({:.2}%)",
                self.get_count(split),
                split.label(),
                self.get_percentage(split)
            );
        }
    }
}
