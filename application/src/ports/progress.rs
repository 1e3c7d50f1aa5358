//! Progress notification port
//!
//! Defines the interface for reporting progress during a review.

use codequorum_domain::Verdict;

/// Callback for progress updates during a multi-model review
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (progress bar, plain log lines, etc.)
pub trait ReviewProgressNotifier: Send + Sync {
    /// Called once before any model is invoked
    fn on_review_start(&self, models: &[String]);

    /// Called when a model's review loop finishes, successfully or not
    fn on_model_complete(&self, model: &str, gate: Verdict, success: bool);

    /// Called after all models have finished
    fn on_review_complete(&self, gate: Verdict);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ReviewProgressNotifier for NoProgress {
    fn on_review_start(&self, _models: &[String]) {}
    fn on_model_complete(&self, _model: &str, _gate: Verdict, _success: bool) {}
    fn on_review_complete(&self, _gate: Verdict) {}
}
