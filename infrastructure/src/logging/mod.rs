//! Logging infrastructure: structured review transcripts.
//!
//! Provides [`JsonlReviewLogger`], a JSONL file writer that implements
//! the [`ReviewLogger`](codequorum_application::ReviewLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlReviewLogger;
