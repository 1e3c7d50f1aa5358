//! Output format value object

use serde::{Deserialize, Serialize};

/// How a review result is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Full markdown report with every model's verdicts
    #[default]
    Full,
    /// Gate, disagreement counts and verdict counts only
    Summary,
    /// The aggregate review as JSON
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_full() {
        assert_eq!(OutputFormat::default(), OutputFormat::Full);
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&OutputFormat::Summary).unwrap(),
            "\"summary\""
        );
        let format: OutputFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(format, OutputFormat::Json);
    }
}
