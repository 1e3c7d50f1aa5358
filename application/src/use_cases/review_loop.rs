//! Model review loop
//!
//! Drives one model from its initial prompt to a final [`ModelReview`],
//! running the observations it asks for along the way, and fans several
//! models out concurrently.
//!
//! ```text
//! prompt ──▶ run model ──▶ OBSERVATIONS? ──no──▶ parse ──▶ ModelReview
//!               ▲              │ yes (budget left, repo known)
//!               │              ▼
//!               └── rebuild ◀─ run observations
//! ```

use crate::config::ReviewParams;
use crate::ports::model_runner::{ModelError, ModelRunner};
use crate::ports::observation_runner::ObservationPort;
use crate::ports::progress::ReviewProgressNotifier;
use crate::ports::review_logger::{NoReviewLogger, ReviewEvent, ReviewLogger};
use codequorum_domain::{
    ModelReview, ObservationResults, PromptTemplate, Verdict, parse_observation_requests,
    parse_review_response,
};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// What is under review: the diff and an optional specification.
///
/// Prompts are always built from these, so rebuilt prompts carry the
/// same diff and spec as the first one.
#[derive(Debug, Clone, Default)]
pub struct ReviewRequest {
    pub diff: String,
    pub spec: Option<String>,
}

impl ReviewRequest {
    pub fn new(diff: impl Into<String>) -> Self {
        Self {
            diff: diff.into(),
            spec: None,
        }
    }

    pub fn with_spec(mut self, spec: Option<String>) -> Self {
        self.spec = spec;
        self
    }

    /// Review prompt for this request, with any observation results so far
    pub fn prompt(&self, observations: Option<&ObservationResults>) -> String {
        PromptTemplate::review_prompt(&self.diff, self.spec.as_deref(), observations)
    }
}

/// Per-model review loop with observation support
pub struct ReviewLoop<R: ModelRunner + 'static, O: ObservationPort + 'static> {
    runner: Arc<R>,
    observations: Arc<O>,
    logger: Arc<dyn ReviewLogger>,
    params: ReviewParams,
}

impl<R: ModelRunner + 'static, O: ObservationPort + 'static> Clone for ReviewLoop<R, O> {
    fn clone(&self) -> Self {
        Self {
            runner: self.runner.clone(),
            observations: self.observations.clone(),
            logger: self.logger.clone(),
            params: self.params.clone(),
        }
    }
}

impl<R: ModelRunner + 'static, O: ObservationPort + 'static> ReviewLoop<R, O> {
    pub fn new(runner: Arc<R>, observations: Arc<O>, params: ReviewParams) -> Self {
        Self {
            runner,
            observations,
            logger: Arc::new(NoReviewLogger),
            params,
        }
    }

    pub fn with_review_logger(mut self, logger: Arc<dyn ReviewLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn params(&self) -> &ReviewParams {
        &self.params
    }

    pub fn runner(&self) -> &Arc<R> {
        &self.runner
    }

    /// Review with a single model.
    ///
    /// Never fails: an invocation error becomes a BLOCK-gated sentinel
    /// review (see [`ModelReview::failed`]).
    pub async fn review_with_model(&self, model: &str, request: &ReviewRequest) -> ModelReview {
        match self.run_loop(model, request).await {
            Ok(review) => review,
            Err(e) => {
                warn!("Model {} failed: {}", model, e);
                self.logger
                    .log(ReviewEvent::model_failed(model, &e.to_string()));
                ModelReview::failed(model, e)
            }
        }
    }

    async fn run_loop(
        &self,
        model: &str,
        request: &ReviewRequest,
    ) -> Result<ModelReview, ModelError> {
        let mut accumulated = ObservationResults::new();
        let mut current_prompt = request.prompt(None);
        let mut iteration = 0;

        loop {
            debug!("Invoking {} (iteration {})", model, iteration);
            self.logger
                .log(ReviewEvent::model_prompt(model, iteration, &current_prompt));

            let response = self
                .runner
                .run(model, &current_prompt, self.params.model_timeout)
                .await?;

            self.logger
                .log(ReviewEvent::model_response(model, iteration, &response));

            let requested = parse_observation_requests(&response);
            if requested.is_empty() || iteration >= self.params.max_observations {
                if !requested.is_empty() {
                    info!(
                        "Model {} exhausted its observation budget ({})",
                        model, self.params.max_observations
                    );
                }
                return Ok(parse_review_response(model, &response).with_observations(accumulated));
            }

            let Some(repo_path) = self.params.repo_path.as_deref() else {
                debug!(
                    "Model {} requested {} observation(s) but no repository is set",
                    model,
                    requested.len()
                );
                return Ok(parse_review_response(model, &response).with_observations(accumulated));
            };

            info!(
                "[{}] Running {} observation(s) (round {})",
                model,
                requested.len(),
                iteration + 1
            );
            let results = self
                .observations
                .run_observations(&requested, repo_path)
                .await;

            if let Ok(value) = serde_json::to_value(&results) {
                self.logger
                    .log(ReviewEvent::observations(model, iteration, &value));
            }
            accumulated.extend(results);

            current_prompt = request.prompt(Some(&accumulated));
            iteration += 1;
        }
    }

    /// Review with several models concurrently.
    ///
    /// Results come back in the order of `models`, whatever order the
    /// models finish in.
    pub async fn review_with_models(
        &self,
        models: &[String],
        request: &ReviewRequest,
        progress: &dyn ReviewProgressNotifier,
    ) -> Vec<ModelReview> {
        let mut join_set = JoinSet::new();

        for (index, model) in models.iter().enumerate() {
            let this = self.clone();
            let model = model.clone();
            let request = request.clone();

            join_set.spawn(async move {
                let review = this.review_with_model(&model, &request).await;
                (index, review)
            });
        }

        let mut slots: Vec<Option<ModelReview>> = vec![None; models.len()];

        while let Some(result) = join_set.join_next().await {
            match result {
                Ok((index, review)) => {
                    progress.on_model_complete(&review.model, review.gate, !review.is_failure());
                    slots[index] = Some(review);
                }
                Err(e) => {
                    warn!("Review task join error: {}", e);
                }
            }
        }

        slots
            .into_iter()
            .zip(models)
            .map(|(slot, model)| {
                slot.unwrap_or_else(|| {
                    progress.on_model_complete(model, Verdict::Block, false);
                    ModelReview::failed(model.as_str(), "review task aborted")
                })
            })
            .collect()
    }
}
