//! Domain layer for codequorum
//!
//! This crate contains the core review logic: the verdict vocabulary, the
//! parser for structured model responses, cross-model aggregation, typed
//! observation requests and the prompt templates. It performs no I/O.
//!
//! # Core Concepts
//!
//! ## Review protocol
//!
//! Each model answers with `### <change_id>` blocks carrying a VERDICT
//! (PASS / CONCERN / BLOCK), optional secondary axes and a REASONING. The
//! parser turns this into a [`ModelReview`]; malformed text degrades to
//! conservative defaults instead of errors.
//!
//! ## Quorum of reviewers
//!
//! - **Gate**: the worst verdict wins; no signal at all is a CONCERN
//! - **Disagreement**: models reporting different verdicts for the same change

pub mod config;
pub mod core;
pub mod diff;
pub mod observation;
pub mod prompt;
pub mod review;

// Re-export commonly used types
pub use config::OutputFormat;
pub use core::{error::DomainError, string::clip};
pub use diff::extract_changed_files;
pub use observation::{
    ObservationError, ObservationKind, ObservationRequest, ObservationResults, ToolInfo,
};
pub use prompt::PromptTemplate;
pub use review::{
    AggregateReview, ChangeVerdict, Confidence, Correctness, Disagreement, DisagreementSeverity,
    Integration, ModelReview, SelfReview, SpecCompliance, TestCoverage, Verdict,
    aggregate_reviews, compute_gate, find_disagreements, parse_observation_requests,
    parse_review_response,
};
