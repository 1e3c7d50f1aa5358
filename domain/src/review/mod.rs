//! Structured code review: verdict vocabulary, response parsing and
//! cross-model aggregation.

pub mod aggregate;
pub mod entities;
pub mod parsing;
pub mod verdict;

pub use aggregate::{aggregate_reviews, compute_gate, find_disagreements};
pub use entities::{
    AggregateReview, ChangeVerdict, Disagreement, DisagreementSeverity, ERROR_CHANGE_ID,
    ModelReview, SelfReview,
};
pub use parsing::{
    parse_changes, parse_confidence, parse_correctness, parse_feature_requests,
    parse_integration, parse_observation_requests, parse_review_response, parse_self_review,
    parse_spec_compliance, parse_test_coverage, parse_verdict,
};
pub use verdict::{Confidence, Correctness, Integration, SpecCompliance, TestCoverage, Verdict};
