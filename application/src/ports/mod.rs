//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod diff_source;
pub mod model_runner;
pub mod observation_runner;
pub mod progress;
pub mod review_logger;
