use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::analysis::{RatioError, SplitRatios};

/// Name of the config file looked up in the working directory and the user config dir
pub const CONFIG_FILE_NAME: &str = "split_config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid split ratios: {0}")]
    Ratios(#[from] RatioError),
}

/// Configuration for a single split run
///
/// Values come from the built-in defaults, then an optional JSON config file,
/// then command line flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Directory holding the processed files
    pub source: PathBuf,

    /// Root directory that receives `train`, `val` and `test`
    pub destination: PathBuf,

    /// Per-file statistics table (CSV or JSON)
    pub statistics_path: PathBuf,

    /// Fraction of each stratum used for validation
    pub val_ratio: f64,

    /// Fraction of each stratum used for testing
    pub test_ratio: f64,

    /// Seed for the shuffle; `None` draws from OS entropy
    pub seed: Option<u64>,

    /// Compute and log the split without moving files
    pub dry_run: bool,

    /// Directory for log files
    pub log_dir: PathBuf,
}

impl Default for SplitConfig {
    fn default() -> Self {
        let ratios = SplitRatios::default();
        Self {
            source: PathBuf::from("data/processed"),
            destination: PathBuf::from("data/splitted"),
            statistics_path: PathBuf::from("data_statistics.csv"),
            val_ratio: ratios.val,
            test_ratio: ratios.test,
            seed: None,
            dry_run: false,
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl SplitConfig {
    /// Load configuration from `explicit` if given, otherwise from the first
    /// implicit location that exists. Missing implicit files mean defaults.
    ///
    /// Returns the file the configuration came from, if any. Nothing is
    /// logged here since this runs before logging is set up.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::candidate_paths()
                .into_iter()
                .find(|candidate| candidate.is_file()),
        };

        match path {
            Some(path) => Ok((Self::from_file(&path)?, Some(path))),
            None => Ok((Self::default(), None)),
        }
    }

    /// Implicit config locations, in lookup order
    pub fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(dirs) = ProjectDirs::from("", "", "create-splits") {
            paths.push(dirs.config_dir().join(CONFIG_FILE_NAME));
        }
        paths
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config)
    }

    /// Validated split ratios
    pub fn ratios(&self) -> Result<SplitRatios, ConfigError> {
        Ok(SplitRatios::new(self.val_ratio, self.test_ratio)?)
    }
}
