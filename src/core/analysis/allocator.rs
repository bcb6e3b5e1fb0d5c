//! Stratified train/val/test allocation.
//!
//! Records are separated into day and night strata, each stratum is shuffled
//! independently, and validation and test files are taken from the tail of
//! each shuffled list. Whatever remains becomes the training set.

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::dataset::{DatasetSplit, Record, Stratum};

/// Tolerance used when rounding stratum size × ratio up to a whole file count.
const ROUNDING_EPSILON: f64 = 1e-9;

#[derive(Debug, Error, PartialEq)]
pub enum RatioError {
    #[error("{split} ratio must be between 0 and 1, got {value}")]
    OutOfRange { split: DatasetSplit, value: f64 },
    #[error("validation + test ratios must not exceed 1, got {val} + {test}")]
    SumTooLarge { val: f64, test: f64 },
}

/// Fractions of each stratum that go to validation and test; train takes the rest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitRatios {
    pub val: f64,  // 0.15 for 15%
    pub test: f64, // 0.10 for 10%
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self {
            val: 0.15,
            test: 0.10,
        }
    }
}

impl SplitRatios {
    pub fn new(val: f64, test: f64) -> Result<Self, RatioError> {
        let ratios = Self { val, test };
        ratios.validate()?;
        Ok(ratios)
    }

    pub fn validate(&self) -> Result<(), RatioError> {
        for (split, value) in [(DatasetSplit::Val, self.val), (DatasetSplit::Test, self.test)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(RatioError::OutOfRange { split, value });
            }
        }
        if self.val + self.test > 1.0 + ROUNDING_EPSILON {
            return Err(RatioError::SumTooLarge {
                val: self.val,
                test: self.test,
            });
        }
        Ok(())
    }

    /// Implied training fraction
    pub fn train(&self) -> f64 {
        (1.0 - self.val - self.test).max(0.0)
    }
}

/// Number of files `ratio` claims out of `size`, rounded up.
///
/// Products that are whole numbers up to floating point noise
/// (`30 * 0.1 == 3.0000000000000004`) are not bumped to the next integer.
/// This deliberately departs from a plain `f64::ceil`, which gives 4 there,
/// so splits of such stratum sizes are one file smaller than a naive ceiling.
pub fn ceil_count(size: usize, ratio: f64) -> usize {
    let raw = size as f64 * ratio;
    let nearest = raw.round();
    if (raw - nearest).abs() < ROUNDING_EPSILON {
        nearest as usize
    } else {
        raw.ceil() as usize
    }
}

/// How many files a single stratum contributes to each split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StratumCounts {
    pub total: usize,
    pub val: usize,
    pub test: usize,
    /// True when the requested counts did not fit into the stratum
    pub clamped: bool,
}

impl StratumCounts {
    /// Requested counts are rounded up independently, so tiny strata can
    /// ask for more files than they hold. Validation is served first, test
    /// gets what is left, and train is never negative.
    pub fn compute(total: usize, ratios: &SplitRatios) -> Self {
        let wanted_val = ceil_count(total, ratios.val);
        let wanted_test = ceil_count(total, ratios.test);

        let val = wanted_val.min(total);
        let test = wanted_test.min(total - val);

        Self {
            total,
            val,
            test,
            clamped: val != wanted_val || test != wanted_test,
        }
    }

    pub fn train(&self) -> usize {
        self.total - self.val - self.test
    }
}

/// Disjoint train/val/test filename lists covering every input record once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitAssignment {
    pub train: Vec<String>,
    pub val: Vec<String>,
    pub test: Vec<String>,
}

impl SplitAssignment {
    pub fn get(&self, split: DatasetSplit) -> &[String] {
        match split {
            DatasetSplit::Train => &self.train,
            DatasetSplit::Val => &self.val,
            DatasetSplit::Test => &self.test,
        }
    }

    pub fn total(&self) -> usize {
        self.train.len() + self.val.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Allocate records into train/val/test, stratified by day/night.
///
/// Each stratum is shuffled with `rng`, then validation files are popped
/// from its tail, followed by test files. The day stratum is processed
/// before the night stratum, and the day remainder precedes the night
/// remainder in the training list.
pub fn allocate_splits<R: Rng + ?Sized>(
    records: &[Record],
    ratios: &SplitRatios,
    rng: &mut R,
) -> SplitAssignment {
    let (night, day): (Vec<&Record>, Vec<&Record>) =
        records.iter().partition(|record| record.stratum() == Stratum::Night);

    let mut assignment = SplitAssignment::default();
    let mut remainders = Vec::with_capacity(2);

    for (stratum, members) in [(Stratum::Day, day), (Stratum::Night, night)] {
        let mut files: Vec<String> = members.into_iter().map(|r| r.filename.clone()).collect();
        files.shuffle(rng);

        let counts = StratumCounts::compute(files.len(), ratios);
        if counts.clamped {
            warn!(
                "Stratum '{}' has only {} files; clamped to val={} test={} train={}",
                stratum.as_str(),
                counts.total,
                counts.val,
                counts.test,
                counts.train()
            );
        }
        debug!(
            "Stratum '{}': total={} val={} test={} train={}",
            stratum.as_str(),
            counts.total,
            counts.val,
            counts.test,
            counts.train()
        );

        pop_into(&mut files, counts.val, &mut assignment.val);
        pop_into(&mut files, counts.test, &mut assignment.test);
        remainders.push(files);
    }

    for files in remainders {
        assignment.train.extend(files);
    }

    assignment
}

fn pop_into(files: &mut Vec<String>, count: usize, target: &mut Vec<String>) {
    for _ in 0..count {
        match files.pop() {
            Some(file) => target.push(file),
            None => break,
        }
    }
}
