//! Review records produced by the parser and the aggregator.

use super::verdict::{Confidence, Correctness, Integration, SpecCompliance, TestCoverage, Verdict};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Change id used for the sentinel change of a failed model invocation.
pub const ERROR_CHANGE_ID: &str = "ERROR";

/// Verdict for one reviewed unit (a file or `file:function`).
///
/// `change_id` is opaque: two models talk about the same change only when
/// their ids are byte-for-byte equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeVerdict {
    pub change_id: String,
    pub verdict: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correctness: Option<Correctness>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec_compliance: Option<SpecCompliance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_coverage: Option<TestCoverage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integration: Option<Integration>,
    pub reasoning: String,
}

impl ChangeVerdict {
    /// Create a verdict with no secondary axes assessed.
    pub fn new(change_id: impl Into<String>, verdict: Verdict, reasoning: impl Into<String>) -> Self {
        Self {
            change_id: change_id.into(),
            verdict,
            correctness: None,
            spec_compliance: None,
            test_coverage: None,
            integration: None,
            reasoning: reasoning.into(),
        }
    }

    pub fn with_correctness(mut self, correctness: Correctness) -> Self {
        self.correctness = Some(correctness);
        self
    }

    pub fn with_spec_compliance(mut self, spec_compliance: SpecCompliance) -> Self {
        self.spec_compliance = Some(spec_compliance);
        self
    }

    pub fn with_test_coverage(mut self, test_coverage: TestCoverage) -> Self {
        self.test_coverage = Some(test_coverage);
        self
    }

    pub fn with_integration(mut self, integration: Integration) -> Self {
        self.integration = Some(integration);
        self
    }
}

/// A model's assessment of its own review quality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfReview {
    pub confidence: Confidence,
    pub limitations: String,
}

/// Complete review from one model for one prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelReview {
    pub model: String,
    /// Overall verdict for this model (see [`ModelReview::derive_gate`])
    pub gate: Verdict,
    /// Changes in order of appearance in the raw response
    pub changes: Vec<ChangeVerdict>,
    /// Full response text, kept for audit and fallback display
    pub raw_response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_review: Option<SelfReview>,
    #[serde(default)]
    pub feature_requests: Vec<String>,
    /// Observation results gathered while this review was produced
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub observations: BTreeMap<String, Value>,
    /// Set only by [`ModelReview::failed`]
    #[serde(default)]
    pub failed: bool,
}

impl ModelReview {
    /// Sentinel review for a model whose invocation failed.
    ///
    /// Always gated BLOCK with a single `ERROR` change, so a broken model
    /// can never let a diff through.
    pub fn failed(model: impl Into<String>, error: impl fmt::Display) -> Self {
        Self {
            model: model.into(),
            gate: Verdict::Block,
            changes: vec![ChangeVerdict::new(
                ERROR_CHANGE_ID,
                Verdict::Block,
                format!("Model invocation failed: {}", error),
            )],
            raw_response: error.to_string(),
            self_review: None,
            feature_requests: Vec::new(),
            observations: BTreeMap::new(),
            failed: true,
        }
    }

    /// Attach observations accumulated during the review loop.
    pub fn with_observations(mut self, observations: BTreeMap<String, Value>) -> Self {
        self.observations = observations;
        self
    }

    /// Derive a gate from parsed changes.
    ///
    /// Any BLOCK wins, else any CONCERN, else PASS. No changes at all yields
    /// CONCERN: a response without structured verdicts is not a clean pass.
    pub fn derive_gate(changes: &[ChangeVerdict]) -> Verdict {
        if changes.is_empty() {
            return Verdict::Concern;
        }
        let mut gate = Verdict::Pass;
        for change in changes {
            if change.verdict == Verdict::Block {
                return Verdict::Block;
            }
            gate = gate.max(change.verdict);
        }
        gate
    }

    /// Whether this review is the sentinel of a failed invocation.
    pub fn is_failure(&self) -> bool {
        self.failed
    }
}

/// How consequential a cross-model verdict split is.
///
/// Declared HIGH first so sorting puts the worst splits on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DisagreementSeverity {
    /// One model passes what another blocks
    High,
    /// BLOCK against CONCERN
    Medium,
    /// PASS against CONCERN
    Low,
}

impl DisagreementSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisagreementSeverity::High => "HIGH",
            DisagreementSeverity::Medium => "MEDIUM",
            DisagreementSeverity::Low => "LOW",
        }
    }
}

impl fmt::Display for DisagreementSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Divergent verdicts for the same change id across models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disagreement {
    pub change_id: String,
    /// Model name -> that model's verdict for this change
    pub verdicts: BTreeMap<String, Verdict>,
    pub severity: DisagreementSeverity,
}

/// One review session across all models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateReview {
    /// Branch, commit or `staged` that was reviewed
    pub diff_ref: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec_file: Option<String>,
    /// Model names in input order, parallel to `reviews`
    pub models: Vec<String>,
    pub reviews: Vec<ModelReview>,
    pub gate: Verdict,
    /// Sorted HIGH, MEDIUM, LOW
    pub disagreements: Vec<Disagreement>,
}

impl AggregateReview {
    pub fn count_by_severity(&self, severity: DisagreementSeverity) -> usize {
        self.disagreements
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Count change verdicts across every model review.
    pub fn count_changes(&self, verdict: Verdict) -> usize {
        self.reviews
            .iter()
            .flat_map(|r| r.changes.iter())
            .filter(|c| c.verdict == verdict)
            .count()
    }
}
