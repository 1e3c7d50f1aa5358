//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod log;
mod models;
mod output;
mod review;

pub use log::FileLogConfig;
pub use models::FileModelsConfig;
pub use output::FileOutputConfig;
pub use review::FileReviewConfig;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigValidationError {
    #[error("models.default: model name cannot be empty")]
    EmptyModelName,

    #[error("models.commands.{model}: command cannot be empty")]
    EmptyCommand { model: String },

    #[error("models.default: '{model}' has no entry in [models.commands]")]
    UnregisteredModel { model: String },

    #[error("review.{field} cannot be 0")]
    InvalidTimeout { field: &'static str },
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Default models and their commands
    pub models: FileModelsConfig,
    /// Review loop settings
    pub review: FileReviewConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Review transcript settings
    pub log: FileLogConfig,
}

impl FileConfig {
    /// Validate the configuration, returning every detected problem.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();

        for model in &self.models.default {
            if model.trim().is_empty() {
                issues.push(ConfigValidationError::EmptyModelName);
            } else if !self.models.commands.contains_key(model) {
                issues.push(ConfigValidationError::UnregisteredModel {
                    model: model.clone(),
                });
            }
        }

        for (model, argv) in &self.models.commands {
            if argv.first().is_none_or(|program| program.trim().is_empty()) {
                issues.push(ConfigValidationError::EmptyCommand {
                    model: model.clone(),
                });
            }
        }

        if self.review.model_timeout_secs == 0 {
            issues.push(ConfigValidationError::InvalidTimeout {
                field: "model_timeout_secs",
            });
        }
        if self.review.observation_timeout_secs == 0 {
            issues.push(ConfigValidationError::InvalidTimeout {
                field: "observation_timeout_secs",
            });
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codequorum_domain::OutputFormat;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[models]
default = ["claude"]

[models.commands]
claude = ["claude", "-p", "--model", "opus"]

[review]
max_observations = 2
base = "develop"

[output]
format = "json"
color = false

[log]
transcript = "review.jsonl"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.models.default, vec!["claude"]);
        assert_eq!(config.models.commands["claude"].len(), 4);
        assert_eq!(config.review.max_observations, 2);
        assert_eq!(config.review.base.as_deref(), Some("develop"));
        assert_eq!(config.output.format, Some(OutputFormat::Json));
        assert!(!config.output.color);
        assert_eq!(
            config.log.transcript.as_deref(),
            Some(std::path::Path::new("review.jsonl"))
        );
    }

    #[test]
    fn test_validate_default_config() {
        assert!(FileConfig::default().validate().is_empty());
    }

    #[test]
    fn test_validate_reports_every_issue() {
        let mut config = FileConfig::default();
        config.models.default = vec!["".into(), "codex".into()];
        config.models.commands.insert("broken".into(), vec![]);
        config.review.observation_timeout_secs = 0;

        let issues = config.validate();
        assert_eq!(
            issues,
            vec![
                ConfigValidationError::EmptyModelName,
                ConfigValidationError::UnregisteredModel {
                    model: "codex".into()
                },
                ConfigValidationError::EmptyCommand {
                    model: "broken".into()
                },
                ConfigValidationError::InvalidTimeout {
                    field: "observation_timeout_secs"
                },
            ]
        );
    }
}
