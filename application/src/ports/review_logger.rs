//! Port for structured review transcripts.
//!
//! Defines the [`ReviewLogger`] trait for recording review events (prompts
//! sent to models, their responses, observation results, failures) to a
//! structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the full
//! review transcript in a machine-readable format (JSONL).

use serde_json::{Value, json};

/// A structured review event for logging.
///
/// Each event has a type string and a JSON payload containing
/// event-specific fields. Implementations add the timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewEvent {
    /// Event type identifier (e.g., "model_prompt", "observations").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ReviewEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }

    pub fn model_prompt(model: &str, iteration: usize, prompt: &str) -> Self {
        Self::new(
            "model_prompt",
            json!({"model": model, "iteration": iteration, "prompt": prompt}),
        )
    }

    pub fn model_response(model: &str, iteration: usize, response: &str) -> Self {
        Self::new(
            "model_response",
            json!({"model": model, "iteration": iteration, "response": response}),
        )
    }

    pub fn observations(model: &str, iteration: usize, results: &Value) -> Self {
        Self::new(
            "observations",
            json!({"model": model, "iteration": iteration, "results": results}),
        )
    }

    pub fn model_failed(model: &str, error: &str) -> Self {
        Self::new("model_failed", json!({"model": model, "error": error}))
    }
}

/// Port for logging review events to a structured log.
///
/// Implementations write each event as a single record (e.g., one JSONL line).
/// `log` is synchronous and infallible; a logger that cannot write drops
/// the event.
pub trait ReviewLogger: Send + Sync {
    /// Record a review event.
    fn log(&self, event: ReviewEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoReviewLogger;

impl ReviewLogger for NoReviewLogger {
    fn log(&self, _event: ReviewEvent) {}
}
