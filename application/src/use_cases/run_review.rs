//! Run Review use case
//!
//! Orchestrates the full review flow: diff → prompt → concurrent model
//! review loops → aggregation.

use crate::ports::diff_source::{DiffSource, DiffSourceError};
use crate::ports::model_runner::{ModelError, ModelRunner};
use crate::ports::observation_runner::ObservationPort;
use crate::ports::progress::{NoProgress, ReviewProgressNotifier};
use crate::use_cases::review_loop::{ReviewLoop, ReviewRequest};
use codequorum_domain::{AggregateReview, PromptTemplate, aggregate_reviews};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Diff reference used when reviewing staged changes.
pub const STAGED_REF: &str = "staged";

/// Errors that can occur during a review
#[derive(Error, Debug)]
pub enum RunReviewError {
    #[error("No models configured")]
    NoModels,

    #[error("No changes to review")]
    EmptyDiff,

    #[error(transparent)]
    Diff(#[from] DiffSourceError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// A specification document to review against
#[derive(Debug, Clone, PartialEq)]
pub struct SpecDocument {
    /// Path as given by the user, shown in reports
    pub path: String,
    pub content: String,
}

impl SpecDocument {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Input for the RunReview use case
#[derive(Debug, Clone, Default)]
pub struct RunReviewInput {
    /// Models to run, in report order
    pub models: Vec<String>,
    /// Branch or commit to review; staged changes when `None`
    pub reference: Option<String>,
    /// Base to diff against
    pub base: Option<String>,
    pub spec: Option<SpecDocument>,
}

impl RunReviewInput {
    pub fn new(models: Vec<String>) -> Self {
        Self {
            models,
            ..Default::default()
        }
    }

    pub fn with_reference(mut self, reference: Option<String>) -> Self {
        self.reference = reference;
        self
    }

    pub fn with_base(mut self, base: Option<String>) -> Self {
        self.base = base;
        self
    }

    pub fn with_spec(mut self, spec: Option<SpecDocument>) -> Self {
        self.spec = spec;
        self
    }

    /// Name of what is being reviewed, for reports
    pub fn diff_ref(&self) -> &str {
        self.reference.as_deref().unwrap_or(STAGED_REF)
    }
}

/// Input for a single-model specification check
#[derive(Debug, Clone)]
pub struct CheckSpecInput {
    pub model: String,
    pub reference: Option<String>,
    pub base: Option<String>,
    pub spec: SpecDocument,
}

/// Use case for running a multi-model code review
pub struct RunReviewUseCase<D, R, O>
where
    D: DiffSource + 'static,
    R: ModelRunner + 'static,
    O: ObservationPort + 'static,
{
    diff_source: Arc<D>,
    review_loop: ReviewLoop<R, O>,
}

impl<D, R, O> RunReviewUseCase<D, R, O>
where
    D: DiffSource + 'static,
    R: ModelRunner + 'static,
    O: ObservationPort + 'static,
{
    pub fn new(diff_source: Arc<D>, review_loop: ReviewLoop<R, O>) -> Self {
        Self {
            diff_source,
            review_loop,
        }
    }

    async fn load_diff(
        &self,
        reference: Option<&str>,
        base: Option<&str>,
    ) -> Result<String, RunReviewError> {
        let diff = self.diff_source.diff(reference, base).await?;
        if diff.trim().is_empty() {
            return Err(RunReviewError::EmptyDiff);
        }
        Ok(diff)
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, input: RunReviewInput) -> Result<AggregateReview, RunReviewError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: RunReviewInput,
        progress: &dyn ReviewProgressNotifier,
    ) -> Result<AggregateReview, RunReviewError> {
        if input.models.is_empty() {
            return Err(RunReviewError::NoModels);
        }

        let diff = self
            .load_diff(input.reference.as_deref(), input.base.as_deref())
            .await?;
        let request =
            ReviewRequest::new(diff).with_spec(input.spec.as_ref().map(|s| s.content.clone()));

        info!(
            "Reviewing {} with {} model(s): {}",
            input.diff_ref(),
            input.models.len(),
            input.models.join(", ")
        );
        progress.on_review_start(&input.models);

        let reviews = self
            .review_loop
            .review_with_models(&input.models, &request, progress)
            .await;

        let result = aggregate_reviews(
            input.diff_ref(),
            reviews,
            input.spec.as_ref().map(|s| s.path.as_str()),
        );

        info!(
            "Review gate: {} ({} disagreement(s))",
            result.gate,
            result.disagreements.len()
        );
        progress.on_review_complete(result.gate);
        Ok(result)
    }

    /// Check the diff against a specification with one model.
    ///
    /// Returns the model's raw response; the requirement-by-requirement
    /// format is not parsed into verdicts.
    pub async fn check_spec(&self, input: CheckSpecInput) -> Result<String, RunReviewError> {
        let diff = self
            .load_diff(input.reference.as_deref(), input.base.as_deref())
            .await?;
        let prompt = PromptTemplate::spec_check_prompt(&diff, &input.spec.content);

        info!(
            "Checking {} against {} with {}",
            input.reference.as_deref().unwrap_or(STAGED_REF),
            input.spec.path,
            input.model
        );

        let response = self
            .review_loop
            .runner()
            .run(&input.model, &prompt, self.review_loop.params().model_timeout)
            .await?;
        Ok(response)
    }
}
