//! Configuration file loading for codequorum
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `CODEQUORUM_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./codequorum.toml` or `./.codequorum.toml`
//! 4. Global: `$XDG_CONFIG_HOME/codequorum/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileLogConfig, FileModelsConfig, FileOutputConfig,
    FileReviewConfig,
};
pub use loader::ConfigLoader;
