//! Model configuration from TOML (`[models]` section)

use crate::models::default_commands;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Model selection and command registry from TOML
///
/// # Example
///
/// ```toml
/// [models]
/// default = ["claude", "gemini"]
///
/// [models.commands]
/// codex = ["codex", "exec", "-"]     # added next to the built-in entries
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelsConfig {
    /// Models used when none is given on the command line
    pub default: Vec<String>,
    /// Model name -> argv used to invoke it (the prompt goes to stdin)
    pub commands: BTreeMap<String, Vec<String>>,
}

impl Default for FileModelsConfig {
    fn default() -> Self {
        Self {
            default: vec!["claude".to_string(), "gemini".to_string()],
            commands: default_commands(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry() {
        let config = FileModelsConfig::default();
        assert_eq!(config.default, vec!["claude", "gemini"]);
        assert_eq!(config.commands["claude"], vec!["claude", "-p"]);
        assert_eq!(config.commands["gemini"], vec!["gemini", "-p", ""]);
    }

    #[test]
    fn test_deserialize_commands() {
        let config: FileModelsConfig = toml::from_str(
            r#"
default = ["codex"]

[commands]
codex = ["codex", "exec", "-"]
"#,
        )
        .unwrap();
        assert_eq!(config.default, vec!["codex"]);
        assert_eq!(config.commands["codex"], vec!["codex", "exec", "-"]);
    }
}
