//! Report formatter trait

use codequorum_domain::AggregateReview;

/// Trait for rendering an aggregated review
pub trait ReportFormatter {
    /// Full markdown report
    fn format(&self, review: &AggregateReview) -> String;

    /// Format as JSON
    fn format_json(&self, review: &AggregateReview) -> String;

    /// Short terminal summary (gate, counts)
    fn format_summary(&self, review: &AggregateReview) -> String;
}
