//! Application layer for codequorum
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ReviewParams;
pub use ports::{
    diff_source::{DiffSource, DiffSourceError},
    model_runner::{ModelError, ModelRunner},
    observation_runner::{NoObservations, ObservationPort},
    progress::{NoProgress, ReviewProgressNotifier},
    review_logger::{NoReviewLogger, ReviewEvent, ReviewLogger},
};
pub use use_cases::review_loop::{ReviewLoop, ReviewRequest};
pub use use_cases::run_review::{
    CheckSpecInput, RunReviewError, RunReviewInput, RunReviewUseCase, STAGED_REF, SpecDocument,
};
