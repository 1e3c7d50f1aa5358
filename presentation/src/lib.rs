//! Presentation layer for codequorum
//!
//! This crate contains CLI definitions, report formatters and
//! progress reporters.

pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::{Cli, Command, OutputFormat, TargetArgs};
pub use output::{ConsoleFormatter, ReportFormatter};
pub use progress::{ProgressReporter, SimpleProgress};
