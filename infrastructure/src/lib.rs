//! Infrastructure layer for codequorum
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod git;
pub mod logging;
pub mod models;
pub mod observation;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileLogConfig, FileModelsConfig,
    FileOutputConfig, FileReviewConfig,
};
pub use git::{GitDiffSource, GitError};
pub use logging::JsonlReviewLogger;
pub use models::{CliModelRunner, default_commands};
pub use observation::LocalObservationRunner;
