//! Review transcript configuration from TOML (`[log]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw log configuration from TOML
///
/// ```toml
/// [log]
/// transcript = ".codequorum/review.jsonl"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLogConfig {
    /// JSONL file receiving prompts, responses and observation results
    pub transcript: Option<PathBuf>,
}
