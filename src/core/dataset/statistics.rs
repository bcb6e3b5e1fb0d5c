//! Loader for the per-file statistics table produced during exploratory analysis.
//!
//! The table has one row per processed file and at least a `filename` and a
//! `night` column. CSV and JSON (array of objects) are supported, chosen by
//! file extension.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use super::Record;

#[derive(Debug, Error)]
pub enum StatisticsError {
    #[error("failed to open statistics table {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse CSV statistics table {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("failed to parse JSON statistics table {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unsupported statistics table format {path:?} (expected .csv or .json)")]
    UnsupportedFormat { path: PathBuf },
    #[error("row {row} of {path:?} has an empty filename")]
    EmptyFilename { path: PathBuf, row: usize },
    #[error("row {row} of {path:?} has filename {filename:?}, which is not relative to the source directory")]
    InvalidFilename {
        path: PathBuf,
        row: usize,
        filename: String,
    },
}

/// Load the statistics table and return one record per distinct filename.
pub fn load_statistics(path: &Path) -> Result<Vec<Record>, StatisticsError> {
    info!("Reading statistics table from: {:?}", path);

    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase());

    let records = match extension.as_deref() {
        Some("csv") => read_csv(path)?,
        Some("json") => read_json(path)?,
        _ => {
            return Err(StatisticsError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
        }
    };

    if let Some(row) = records.iter().position(|r| r.filename.trim().is_empty()) {
        return Err(StatisticsError::EmptyFilename {
            path: path.to_path_buf(),
            row: row + 1,
        });
    }

    if let Some(row) = records.iter().position(|r| !stays_inside(&r.filename)) {
        return Err(StatisticsError::InvalidFilename {
            path: path.to_path_buf(),
            row: row + 1,
            filename: records[row].filename.clone(),
        });
    }

    let records = dedup_records(records);
    debug!("Loaded {} records", records.len());
    Ok(records)
}

fn open(path: &Path) -> Result<File, StatisticsError> {
    File::open(path).map_err(|source| StatisticsError::Open {
        path: path.to_path_buf(),
        source,
    })
}

fn read_csv(path: &Path) -> Result<Vec<Record>, StatisticsError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(open(path)?));

    reader
        .deserialize::<Record>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| StatisticsError::Csv {
            path: path.to_path_buf(),
            source,
        })
}

fn read_json(path: &Path) -> Result<Vec<Record>, StatisticsError> {
    serde_json::from_reader(BufReader::new(open(path)?)).map_err(|source| {
        StatisticsError::Json {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Filenames are joined onto the source and split directories, so absolute
/// paths and `..` components would move files outside of them.
fn stays_inside(filename: &str) -> bool {
    Path::new(filename)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Keep the first occurrence of each filename so every file is split exactly once.
fn dedup_records(records: Vec<Record>) -> Vec<Record> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(records.len());

    for record in records {
        if seen.insert(record.filename.clone()) {
            unique.push(record);
        } else {
            warn!("Duplicate filename found in statistics table: {}", record.filename);
        }
    }

    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_csv_with_dataframe_booleans() {
        let file = write_temp(
            ".csv",
            "filename,night,mean_brightness\n\
             segment-1.tfrecord,False,0.61\n\
             segment-2.tfrecord,True,0.12\n\
             segment-3.tfrecord,false,0.55\n",
        );

        let records = load_statistics(file.path()).unwrap();
        assert_eq!(
            records,
            vec![
                Record::new("segment-1.tfrecord", false),
                Record::new("segment-2.tfrecord", true),
                Record::new("segment-3.tfrecord", false),
            ]
        );
    }

    #[test]
    fn test_load_json_records() {
        let file = write_temp(
            ".json",
            r#"[
                {"filename": "a.tfrecord", "night": false, "vehicles": 12},
                {"filename": "b.tfrecord", "night": true}
            ]"#,
        );

        let records = load_statistics(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[1].is_night);
    }

    #[test]
    fn test_duplicates_are_dropped() {
        let file = write_temp(
            ".csv",
            "filename,night\na.tfrecord,false\nb.tfrecord,true\na.tfrecord,true\n",
        );

        let records = load_statistics(file.path()).unwrap();
        assert_eq!(
            records,
            vec![
                Record::new("a.tfrecord", false),
                Record::new("b.tfrecord", true),
            ]
        );
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = load_statistics(Path::new("does/not/exist.csv"));
        assert!(matches!(result, Err(StatisticsError::Open { .. })));
    }

    #[test]
    fn test_unknown_extension_is_an_error() {
        let file = write_temp(".pkl", "binary");
        let result = load_statistics(file.path());
        assert!(matches!(result, Err(StatisticsError::UnsupportedFormat { .. })));
    }

    #[test]
    fn test_empty_filename_is_an_error() {
        let file = write_temp(".csv", "filename,night\na.tfrecord,false\n,true\n");
        let result = load_statistics(file.path());
        assert!(matches!(
            result,
            Err(StatisticsError::EmptyFilename { row: 2, .. })
        ));
    }

    #[test]
    fn test_absolute_filename_is_rejected() {
        let file = write_temp(
            ".csv",
            "filename,night\na.tfrecord,false\n/tmp/outside.tfrecord,true\n",
        );
        match load_statistics(file.path()) {
            Err(StatisticsError::InvalidFilename { row, filename, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(filename, "/tmp/outside.tfrecord");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_parent_dir_filename_is_rejected() {
        let file = write_temp(
            ".json",
            r#"[
                {"filename": "nested/a.tfrecord", "night": false},
                {"filename": "../outside.tfrecord", "night": true}
            ]"#,
        );
        assert!(matches!(
            load_statistics(file.path()),
            Err(StatisticsError::InvalidFilename { row: 2, .. })
        ));
    }

    #[test]
    fn test_nested_relative_filename_is_accepted() {
        let file = write_temp(".csv", "filename,night\nsegments/a.tfrecord,false\n");
        let records = load_statistics(file.path()).unwrap();
        assert_eq!(records[0].filename, "segments/a.tfrecord");
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let file = write_temp(".csv", "filename\na.tfrecord\n");
        let result = load_statistics(file.path());
        assert!(matches!(result, Err(StatisticsError::Csv { .. })));
    }
}
