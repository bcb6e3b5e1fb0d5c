mod allocator;
mod summary;

pub use allocator::{allocate_splits, RatioError, SplitAssignment, SplitRatios};
pub use summary::SplitSummary;
