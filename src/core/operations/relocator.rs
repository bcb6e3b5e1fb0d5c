//! Relocation of split files from the source directory into
//! `<destination>/{train,val,test}`.
//!
//! Moves run in a fixed order (test, then val, then train). Every source path
//! is checked before the first move so a missing file stops the run with
//! nothing moved. A failure during the move loop halts it; files already
//! moved stay where they are.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, error, info};

use super::file_ops::{ensure_split_dirs, move_file, FileOpError};
use crate::core::analysis::SplitAssignment;
use crate::core::dataset::DatasetSplit;

/// Order in which splits are relocated
const RELOCATION_ORDER: [DatasetSplit; 3] =
    [DatasetSplit::Test, DatasetSplit::Val, DatasetSplit::Train];

#[derive(Debug, Error)]
pub enum RelocationError {
    #[error("File not found. Check input path: {missing} source file(s) missing, first: {first:?}")]
    MissingSources { missing: usize, first: PathBuf },
    #[error("Could not prepare destination folders: {0}")]
    Destination(#[source] FileOpError),
    #[error("Moving {file:?} halted relocation after {moved} file(s): {source}")]
    MoveHalted {
        file: PathBuf,
        moved: usize,
        #[source]
        source: FileOpError,
    },
}

/// A single move in a relocation plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveAction {
    pub filename: String,
    pub split: DatasetSplit,
    pub source_path: PathBuf,
    pub destination_path: PathBuf,
}

/// Every move needed to materialize a split assignment on disk
#[derive(Debug, Clone, Default)]
pub struct RelocationPlan {
    pub destination: PathBuf,
    pub actions: Vec<MoveAction>,
}

impl RelocationPlan {
    pub fn new(source: &Path, destination: &Path, assignment: &SplitAssignment) -> Self {
        let actions = RELOCATION_ORDER
            .iter()
            .flat_map(|&split| {
                let split_dir = destination.join(split.as_str());
                assignment.get(split).iter().map(move |filename| MoveAction {
                    filename: filename.clone(),
                    split,
                    source_path: source.join(filename),
                    destination_path: split_dir.join(filename),
                })
            })
            .collect();

        Self {
            destination: destination.to_path_buf(),
            actions,
        }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Source paths of planned moves that do not exist
    pub fn missing_sources(&self) -> Vec<&Path> {
        self.actions
            .iter()
            .map(|action| action.source_path.as_path())
            .filter(|path| !path.exists())
            .collect()
    }
}

/// Outcome of executing a relocation plan
#[derive(Debug)]
pub struct RelocationReport {
    pub planned: usize,
    pub moved: usize,
    pub error: Option<RelocationError>,
}

impl RelocationReport {
    pub fn is_complete(&self) -> bool {
        self.error.is_none() && self.moved == self.planned
    }
}

/// Create the split folders and execute the plan.
///
/// Errors are logged and returned inside the report rather than propagated.
pub fn relocate(plan: &RelocationPlan) -> RelocationReport {
    let mut report = RelocationReport {
        planned: plan.len(),
        moved: 0,
        error: None,
    };

    if let Err(e) = ensure_split_dirs(&plan.destination) {
        let e = RelocationError::Destination(e);
        error!("{}", e);
        report.error = Some(e);
        return report;
    }

    let missing = plan.missing_sources();
    if let Some(first) = missing.first() {
        let e = RelocationError::MissingSources {
            missing: missing.len(),
            first: first.to_path_buf(),
        };
        error!("{}", e);
        report.error = Some(e);
        return report;
    }

    info!("Moving files to target folders");

    for action in &plan.actions {
        if let Err(e) = move_file(&action.source_path, &action.destination_path) {
            if e.is_not_found() {
                error!("File not found. Check input path");
            }
            let e = RelocationError::MoveHalted {
                file: action.source_path.clone(),
                moved: report.moved,
                source: e,
            };
            error!("{}", e);
            report.error = Some(e);
            return report;
        }
        debug!("Moved {} to {}", action.filename, action.split);
        report.moved += 1;
    }

    info!("Relocation complete: {} files moved", report.moved);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn assignment() -> SplitAssignment {
        SplitAssignment {
            train: vec!["a.tfrecord".into(), "b.tfrecord".into()],
            val: vec!["c.tfrecord".into()],
            test: vec!["d.tfrecord".into()],
        }
    }

    fn populate(source: &Path, assignment: &SplitAssignment) {
        fs::create_dir_all(source).unwrap();
        for split in DatasetSplit::all() {
            for file in assignment.get(split) {
                fs::write(source.join(file), file.as_bytes()).unwrap();
            }
        }
    }

    #[test]
    fn test_plan_order_is_test_val_train() {
        let plan = RelocationPlan::new(Path::new("src"), Path::new("dst"), &assignment());

        let order: Vec<DatasetSplit> = plan.actions.iter().map(|a| a.split).collect();
        assert_eq!(
            order,
            vec![
                DatasetSplit::Test,
                DatasetSplit::Val,
                DatasetSplit::Train,
                DatasetSplit::Train
            ]
        );
        assert_eq!(plan.actions[0].source_path, PathBuf::from("src/d.tfrecord"));
        assert_eq!(
            plan.actions[0].destination_path,
            PathBuf::from("dst/test/d.tfrecord")
        );
    }

    #[test]
    fn test_relocate_moves_every_file() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("processed");
        let destination = tmp.path().join("splitted");
        let assignment = assignment();
        populate(&source, &assignment);

        let plan = RelocationPlan::new(&source, &destination, &assignment);
        let report = relocate(&plan);

        assert!(report.is_complete());
        assert_eq!(report.moved, 4);
        for split in DatasetSplit::all() {
            for file in assignment.get(split) {
                assert!(destination.join(split.as_str()).join(file).is_file());
                assert!(!source.join(file).exists());
            }
        }
    }

    #[test]
    fn test_missing_source_moves_nothing() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("processed");
        let destination = tmp.path().join("splitted");
        let assignment = assignment();
        populate(&source, &assignment);
        fs::remove_file(source.join("b.tfrecord")).unwrap();

        let plan = RelocationPlan::new(&source, &destination, &assignment);
        let report = relocate(&plan);

        assert!(!report.is_complete());
        assert_eq!(report.moved, 0);
        match report.error {
            Some(RelocationError::MissingSources { missing, first }) => {
                assert_eq!(missing, 1);
                assert_eq!(first, source.join("b.tfrecord"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        // Folders are still created, untouched sources stay in place
        assert!(destination.join("test").is_dir());
        assert!(source.join("d.tfrecord").is_file());
    }

    #[test]
    fn test_second_run_reports_missing_files() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("processed");
        let destination = tmp.path().join("splitted");
        let assignment = assignment();
        populate(&source, &assignment);

        let plan = RelocationPlan::new(&source, &destination, &assignment);
        assert!(relocate(&plan).is_complete());

        let report = relocate(&plan);
        assert_eq!(report.moved, 0);
        assert!(matches!(
            report.error,
            Some(RelocationError::MissingSources { missing: 4, .. })
        ));
    }

    #[test]
    fn test_empty_plan_still_creates_folders() {
        let tmp = TempDir::new().unwrap();
        let destination = tmp.path().join("splitted");
        let plan = RelocationPlan::new(tmp.path(), &destination, &SplitAssignment::default());

        let report = relocate(&plan);

        assert!(report.is_complete());
        assert!(destination.join("train").is_dir());
        assert!(destination.join("val").is_dir());
    }

    #[test]
    fn test_failed_move_halts_without_rollback() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("processed");
        let destination = tmp.path().join("splitted");
        let assignment = assignment();
        populate(&source, &assignment);

        // A non-empty directory where the first train file should land
        let blocker = destination.join("train").join("a.tfrecord");
        fs::create_dir_all(&blocker).unwrap();
        fs::write(blocker.join("keep"), b"x").unwrap();

        let plan = RelocationPlan::new(&source, &destination, &assignment);
        let report = relocate(&plan);

        assert!(!report.is_complete());
        assert_eq!(report.moved, 2);
        match &report.error {
            Some(RelocationError::MoveHalted { file, moved, .. }) => {
                assert_eq!(file, &source.join("a.tfrecord"));
                assert_eq!(*moved, 2);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        // Earlier moves stay in place
        assert!(destination.join("test").join("d.tfrecord").is_file());
        assert!(destination.join("val").join("c.tfrecord").is_file());
        assert!(!source.join("d.tfrecord").exists());
        assert!(!source.join("c.tfrecord").exists());

        // The failed file and everything queued after it stay in the source
        assert!(source.join("a.tfrecord").is_file());
        assert!(source.join("b.tfrecord").is_file());
        assert!(!destination.join("train").join("b.tfrecord").exists());
        assert!(blocker.join("keep").is_file());
    }
}
