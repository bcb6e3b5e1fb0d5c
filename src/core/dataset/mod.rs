mod record;
mod split;
mod statistics;

pub use record::Record;
pub use split::{DatasetSplit, Stratum};
pub use statistics::{load_statistics, StatisticsError};
