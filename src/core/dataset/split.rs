use std::fmt;

/// One of the three destination subsets a file can be assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetSplit {
    Train,
    Val,
    Test,
}

impl DatasetSplit {
    /// Folder name under the destination root
    pub fn as_str(&self) -> &str {
        match self {
            DatasetSplit::Train => "train",
            DatasetSplit::Val => "val",
            DatasetSplit::Test => "test",
        }
    }

    /// Human readable name used in summary log lines
    pub fn label(&self) -> &str {
        match self {
            DatasetSplit::Train => "training",
            DatasetSplit::Val => "validation",
            DatasetSplit::Test => "testing",
        }
    }

    pub fn all() -> [DatasetSplit; 3] {
        [DatasetSplit::Train, DatasetSplit::Val, DatasetSplit::Test]
    }
}

impl fmt::Display for DatasetSplit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Day/night label used to stratify the split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stratum {
    Day,
    Night,
}

impl Stratum {
    pub fn from_is_night(is_night: bool) -> Self {
        if is_night {
            Stratum::Night
        } else {
            Stratum::Day
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Stratum::Day => "day",
            Stratum::Night => "night",
        }
    }
}
