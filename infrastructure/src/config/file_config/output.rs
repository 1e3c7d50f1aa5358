//! Report output settings from TOML (`[output]` section)

use codequorum_domain::OutputFormat;
use serde::{Deserialize, Serialize};

/// `[output]` section: how `review` renders its report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Report format used when `--output` is not given
    pub format: Option<OutputFormat>,
    /// ANSI colors in reports and progress
    pub color: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
        }
    }
}

impl FileOutputConfig {
    /// The command-line choice wins over the configured format.
    pub fn effective_format(&self, requested: Option<OutputFormat>) -> OutputFormat {
        requested.or(self.format).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileConfig;

    #[test]
    fn test_configured_format_and_color() {
        let toml_str = r#"
[output]
format = "summary"
color = false
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(config.output.format, Some(OutputFormat::Summary));
        assert!(!config.output.color);
    }

    #[test]
    fn test_effective_format_precedence() {
        let configured = FileOutputConfig {
            format: Some(OutputFormat::Json),
            color: true,
        };

        assert_eq!(
            configured.effective_format(Some(OutputFormat::Summary)),
            OutputFormat::Summary
        );
        assert_eq!(configured.effective_format(None), OutputFormat::Json);
        assert_eq!(
            FileOutputConfig::default().effective_format(None),
            OutputFormat::Full
        );
    }
}
