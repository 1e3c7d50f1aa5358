//! Observation requests as emitted by models.

use super::error::ObservationError;
use super::kind::ObservationKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Name given to requests that do not carry one.
pub const UNNAMED: &str = "unnamed";

/// One `{name, tool, params}` entry of an OBSERVATIONS block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRequest {
    /// Key under which the result is reported back to the model
    pub name: String,
    pub tool: Option<String>,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl ObservationRequest {
    pub fn new(name: impl Into<String>, tool: impl Into<String>, params: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            tool: Some(tool.into()),
            params,
        }
    }

    /// Lenient conversion from one JSON array entry.
    ///
    /// Non-objects are rejected. A missing name becomes `"unnamed"`, missing
    /// or non-object params become `{}`, and an empty tool counts as missing.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let name = obj
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(UNNAMED)
            .to_string();
        let tool = obj
            .get("tool")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        let params = obj
            .get("params")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        Some(Self { name, tool, params })
    }

    /// Resolve into a typed observation against `repo_path`.
    pub fn resolve(&self, repo_path: &Path) -> Result<ObservationKind, ObservationError> {
        let tool = self.tool.as_deref().ok_or(ObservationError::MissingTool)?;
        ObservationKind::resolve(tool, &self.params, repo_path)
    }
}
