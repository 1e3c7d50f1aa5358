//! Observation tool errors.
//!
//! Observation failures never abort a review. Every variant is eventually
//! rendered into an `{"error": ...}` JSON value scoped to one named request
//! (see [`ObservationError::to_result`]).

use serde_json::{Map, Value, json};
use thiserror::Error;

/// Failure of a single observation request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ObservationError {
    #[error("No tool specified")]
    MissingTool,

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Parameter error: {message}")]
    InvalidParams {
        tool: String,
        message: String,
        received: Vec<String>,
    },

    #[error("{tool} timed out after {secs}s")]
    Timeout { tool: String, secs: u64 },

    #[error("{path}: {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("{0}")]
    Command(String),

    #[error("Function '{0}' not found")]
    FunctionNotFound(String),

    #[error("{0}")]
    Failed(String),
}

impl ObservationError {
    pub fn io(path: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub fn parse(path: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Parse {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Render as a JSON error result.
    ///
    /// `context` is an extra `(key, value)` pair identifying what the tool was
    /// asked about, e.g. `("file", "src/app.py")`.
    pub fn to_result(&self, context: Option<(&str, &str)>) -> Value {
        let mut map = Map::new();
        map.insert("error".to_string(), json!(self.to_string()));
        if let ObservationError::InvalidParams { received, .. } = self {
            map.insert("params_received".to_string(), json!(received));
        }
        if let Some((key, value)) = context {
            map.insert(key.to_string(), json!(value));
        }
        Value::Object(map)
    }
}
