mod split_config;

pub use split_config::{ConfigError, SplitConfig};
