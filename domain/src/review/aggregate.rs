//! Cross-model aggregation: disagreements and the combined gate.
//!
//! Everything here is a pure fold over already-completed reviews.

use super::entities::{AggregateReview, Disagreement, DisagreementSeverity, ModelReview};
use super::verdict::Verdict;
use std::collections::{BTreeMap, BTreeSet};

fn severity_of(verdicts: &BTreeSet<Verdict>) -> DisagreementSeverity {
    if verdicts.contains(&Verdict::Pass) && verdicts.contains(&Verdict::Block) {
        DisagreementSeverity::High
    } else if verdicts.contains(&Verdict::Block) {
        DisagreementSeverity::Medium
    } else {
        DisagreementSeverity::Low
    }
}

/// Find change ids on which the models do not agree.
///
/// Only models that reported a change id take part in its comparison.
/// Output is sorted HIGH, MEDIUM, LOW; within one severity, change ids keep
/// the order in which they were first seen. Fewer than two reviews never
/// disagree.
pub fn find_disagreements(reviews: &[ModelReview]) -> Vec<Disagreement> {
    if reviews.len() < 2 {
        return Vec::new();
    }

    let mut order: Vec<&str> = Vec::new();
    let mut by_change: BTreeMap<&str, BTreeMap<String, Verdict>> = BTreeMap::new();

    for review in reviews {
        for change in &review.changes {
            let entry = by_change.entry(change.change_id.as_str()).or_insert_with(|| {
                order.push(change.change_id.as_str());
                BTreeMap::new()
            });
            entry.insert(review.model.clone(), change.verdict);
        }
    }

    let mut disagreements: Vec<Disagreement> = order
        .into_iter()
        .filter_map(|change_id| {
            let verdicts = by_change.remove(change_id)?;
            let distinct: BTreeSet<Verdict> = verdicts.values().copied().collect();
            (distinct.len() > 1).then(|| Disagreement {
                change_id: change_id.to_string(),
                severity: severity_of(&distinct),
                verdicts,
            })
        })
        .collect();

    disagreements.sort_by_key(|d| d.severity);
    disagreements
}

/// Combine per-model gates: any BLOCK, else any CONCERN, else PASS.
///
/// No reviews at all is a CONCERN.
pub fn compute_gate(reviews: &[ModelReview]) -> Verdict {
    reviews
        .iter()
        .map(|r| r.gate)
        .max()
        .unwrap_or(Verdict::Concern)
}

/// Build the [`AggregateReview`] for one review session.
pub fn aggregate_reviews(
    diff_ref: &str,
    reviews: Vec<ModelReview>,
    spec_file: Option<&str>,
) -> AggregateReview {
    AggregateReview {
        diff_ref: diff_ref.to_string(),
        spec_file: spec_file.map(str::to_string),
        models: reviews.iter().map(|r| r.model.clone()).collect(),
        gate: compute_gate(&reviews),
        disagreements: find_disagreements(&reviews),
        reviews,
    }
}
