//! Model runner port
//!
//! Defines the single capability the review loop needs from a model: run it
//! with a prompt, bounded by a timeout, and get text back.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while invoking a model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Unknown model: {model}. Available: {available:?}")]
    UnknownModel {
        model: String,
        available: Vec<String>,
    },

    #[error("Failed to start model {model}: {message}")]
    Spawn { model: String, message: String },

    #[error("Model {model} timed out after {secs}s")]
    Timeout { model: String, secs: u64 },

    #[error("Model {model} failed: {stderr}")]
    Failed { model: String, stderr: String },
}

/// Runner for named review models
///
/// This port defines how the application layer invokes models.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait ModelRunner: Send + Sync {
    /// Run `model` with `prompt` and return its full response text.
    async fn run(&self, model: &str, prompt: &str, timeout: Duration)
    -> Result<String, ModelError>;

    /// Names of all models this runner knows how to invoke
    fn available_models(&self) -> Vec<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let timeout = ModelError::Timeout {
            model: "gemini".to_string(),
            secs: 300,
        };
        assert_eq!(timeout.to_string(), "Model gemini timed out after 300s");

        let failed = ModelError::Failed {
            model: "claude".to_string(),
            stderr: "rate limited".to_string(),
        };
        assert_eq!(failed.to_string(), "Model claude failed: rate limited");
    }
}
