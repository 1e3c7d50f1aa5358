//! Review loop configuration from TOML (`[review]` section)

use codequorum_application::ReviewParams;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Review configuration from TOML
///
/// # Example
///
/// ```toml
/// [review]
/// max_observations = 3
/// model_timeout_secs = 300
/// observation_timeout_secs = 30
/// context_lines = 10
/// base = "main"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReviewConfig {
    /// Observation rounds each model may request
    pub max_observations: usize,
    /// Timeout for one model invocation
    pub model_timeout_secs: u64,
    /// Timeout for one observation tool call
    pub observation_timeout_secs: u64,
    /// Unified diff context lines
    pub context_lines: u32,
    /// Base branch for branch reviews (origin/main or main when unset)
    pub base: Option<String>,
}

impl Default for FileReviewConfig {
    fn default() -> Self {
        Self {
            max_observations: 3,
            model_timeout_secs: 300,
            observation_timeout_secs: 30,
            context_lines: 10,
            base: None,
        }
    }
}

impl FileReviewConfig {
    pub fn observation_timeout(&self) -> Duration {
        Duration::from_secs(self.observation_timeout_secs)
    }

    /// Loop parameters for the application layer. The repository is set by
    /// the caller.
    pub fn to_review_params(&self) -> ReviewParams {
        ReviewParams::default()
            .with_max_observations(self.max_observations)
            .with_model_timeout(Duration::from_secs(self.model_timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config: FileReviewConfig = toml::from_str("max_observations = 1").unwrap();
        assert_eq!(config.max_observations, 1);
        assert_eq!(config.model_timeout_secs, 300);
        assert!(config.base.is_none());
    }

    #[test]
    fn test_to_review_params() {
        let config = FileReviewConfig {
            max_observations: 0,
            model_timeout_secs: 12,
            ..Default::default()
        };
        let params = config.to_review_params();
        assert_eq!(params.max_observations, 0);
        assert_eq!(params.model_timeout, Duration::from_secs(12));
        assert!(params.repo_path.is_none());
    }
}
