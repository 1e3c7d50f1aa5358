//! Review parameters: review loop control.
//!
//! [`ReviewParams`] groups the static parameters that control the
//! per-model review loop in
//! [`ReviewLoop`](crate::use_cases::review_loop::ReviewLoop).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Review loop control parameters.
///
/// Controls the observation budget, the model timeout and the repository
/// observations run against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewParams {
    /// Maximum observation rounds before a verdict is forced.
    pub max_observations: usize,
    /// Timeout for each single model invocation.
    pub model_timeout: Duration,
    /// Repository root for observations. Without one, observation
    /// requests are ignored.
    pub repo_path: Option<PathBuf>,
}

impl Default for ReviewParams {
    fn default() -> Self {
        Self {
            max_observations: 3,
            model_timeout: Duration::from_secs(300),
            repo_path: None,
        }
    }
}

impl ReviewParams {
    // ==================== Builder Methods ====================

    pub fn with_max_observations(mut self, max: usize) -> Self {
        self.max_observations = max;
        self
    }

    pub fn with_model_timeout(mut self, timeout: Duration) -> Self {
        self.model_timeout = timeout;
        self
    }

    pub fn with_repo_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.repo_path = Some(path.into());
        self
    }
}
