//! Observations: on-demand repository queries a model can ask for mid-review.
//!
//! A model lists what it wants in an `### OBSERVATIONS` block. Each entry is
//! an [`ObservationRequest`]; resolving it yields a typed [`ObservationKind`]
//! that the infrastructure layer executes. Results travel back to the model
//! as JSON, keyed by request name ([`ObservationResults`]).

pub mod error;
pub mod kind;
pub mod request;

pub use error::ObservationError;
pub use kind::{ObservationKind, REPO_PATH_PARAM, TOOLS, ToolInfo};
pub use request::ObservationRequest;

use serde_json::Value;
use std::collections::BTreeMap;

/// Observation results keyed by request name.
pub type ObservationResults = BTreeMap<String, Value>;
