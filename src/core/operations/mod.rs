mod file_ops;
mod relocator;

pub use relocator::{relocate, RelocationError, RelocationPlan, RelocationReport};
