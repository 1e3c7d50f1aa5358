//! Console output formatter for review results

use crate::output::formatter::ReportFormatter;
use codequorum_domain::{
    AggregateReview, ChangeVerdict, Disagreement, DisagreementSeverity, ModelReview, Verdict,
};
use colored::{ColoredString, Colorize};

/// Formats aggregated reviews for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete markdown report
    pub fn format(review: &AggregateReview) -> String {
        let mut output = String::new();

        output.push_str(&format!("{}\n\n", "# Code Review Report".cyan().bold()));
        output.push_str(&format!("{} {}\n", "**Branch:**".bold(), review.diff_ref));
        output.push_str(&format!(
            "{} {}\n",
            "**Models:**".bold(),
            review.models.join(", ")
        ));
        output.push_str(&format!(
            "{} {} {}\n",
            "**Gate:**".bold(),
            Self::badge(review.gate),
            review.gate
        ));
        if let Some(spec) = &review.spec_file {
            output.push_str(&format!("{} {}\n", "**Spec:**".bold(), spec));
        }
        output.push('\n');

        // Disagreements first
        if !review.disagreements.is_empty() {
            output.push_str(&Self::format_disagreements(&review.disagreements));
        }

        for model_review in &review.reviews {
            output.push_str(&Self::format_model_review(model_review));
        }

        output
    }

    /// Format as JSON
    pub fn format_json(review: &AggregateReview) -> String {
        serde_json::to_string_pretty(review).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format a brief summary for terminal output
    pub fn format_summary(review: &AggregateReview) -> String {
        let mut lines = vec![
            format!("{} {}", "Gate:".bold(), Self::colored_verdict(review.gate)),
            format!("{} {}", "Models:".bold(), review.models.join(", ")),
        ];

        if !review.disagreements.is_empty() {
            lines.push(format!(
                "{} {} high, {} medium, {} low",
                "Disagreements:".bold(),
                review.count_by_severity(DisagreementSeverity::High),
                review.count_by_severity(DisagreementSeverity::Medium),
                review.count_by_severity(DisagreementSeverity::Low),
            ));
        }

        lines.push(format!(
            "{} {} pass, {} concern, {} block",
            "Verdicts:".bold(),
            review.count_changes(Verdict::Pass),
            review.count_changes(Verdict::Concern),
            review.count_changes(Verdict::Block),
        ));

        lines.join("\n")
    }

    /// Format only the cross-model disagreements
    pub fn format_compare(review: &AggregateReview) -> String {
        if review.disagreements.is_empty() {
            return format!(
                "{}\n",
                "No disagreements - models agree on all changes.".green()
            );
        }

        let mut output = format!(
            "Found {} disagreement(s):\n\n",
            review.disagreements.len()
        );
        for d in &review.disagreements {
            output.push_str(&format!(
                "{} {}\n",
                Self::severity_tag(d.severity),
                d.change_id.bold()
            ));
            for (model, verdict) in &d.verdicts {
                output.push_str(&format!("  {}: {}\n", model, Self::colored_verdict(*verdict)));
            }
            output.push('\n');
        }
        output
    }

    /// Format the model registry with availability markers.
    ///
    /// Entries are `(name, executable, available)`.
    pub fn format_models<'a>(
        entries: impl IntoIterator<Item = (&'a str, &'a str, bool)>,
    ) -> String {
        let mut output = format!("{}\n\n", "Available models:".cyan().bold());
        for (name, program, available) in entries {
            let status = if available {
                "[available]".green()
            } else {
                "[not found]".red()
            };
            output.push_str(&format!("  {}: {} {}\n", name.bold(), program, status));
        }
        output
    }

    fn format_disagreements(disagreements: &[Disagreement]) -> String {
        let mut output = Self::section_header("Disagreements");
        output.push_str("The following changes have different verdicts across models:\n\n");

        for d in disagreements {
            let verdicts = d
                .verdicts
                .iter()
                .map(|(model, verdict)| format!("{}: {}", model, verdict))
                .collect::<Vec<_>>()
                .join(", ");
            output.push_str(&format!(
                "- **{}** {}: {}\n",
                d.change_id,
                Self::severity_tag(d.severity),
                verdicts
            ));
        }

        output.push('\n');
        output
    }

    fn format_model_review(review: &ModelReview) -> String {
        let mut output = format!(
            "{} {}\n\n",
            format!("## {}", review.model).yellow().bold(),
            Self::badge(review.gate)
        );

        for change in &review.changes {
            output.push_str(&Self::format_change(change));
        }

        if let Some(self_review) = &review.self_review {
            output.push_str(&format!(
                "{} {}\n",
                "**Confidence:**".bold(),
                self_review.confidence
            ));
            if !self_review.limitations.is_empty() {
                output.push_str(&format!(
                    "{} {}\n",
                    "**Limitations:**".bold(),
                    self_review.limitations
                ));
            }
            output.push('\n');
        }

        if !review.feature_requests.is_empty() {
            output.push_str(&format!("{}\n", "**Feature Requests:**".bold()));
            for request in &review.feature_requests {
                output.push_str(&format!("  * {}\n", request));
            }
            output.push('\n');
        }

        output
    }

    fn format_change(change: &ChangeVerdict) -> String {
        let mut lines = vec![
            format!("### {}", change.change_id).cyan().to_string(),
            format!("**Verdict:** {}", Self::colored_verdict(change.verdict)),
        ];

        if let Some(correctness) = change.correctness {
            lines.push(format!("**Correctness:** {}", correctness));
        }
        if let Some(spec_compliance) = change.spec_compliance {
            lines.push(format!("**Spec Compliance:** {}", spec_compliance));
        }
        if let Some(test_coverage) = change.test_coverage {
            lines.push(format!("**Test Coverage:** {}", test_coverage));
        }
        if let Some(integration) = change.integration {
            lines.push(format!("**Integration:** {}", integration));
        }

        if !change.reasoning.is_empty() {
            lines.push(String::new());
            lines.push(change.reasoning.clone());
        }

        lines.push(String::new());
        format!("{}\n", lines.join("\n"))
    }

    fn badge(verdict: Verdict) -> ColoredString {
        Self::paint(verdict, verdict.badge())
    }

    fn colored_verdict(verdict: Verdict) -> ColoredString {
        Self::paint(verdict, verdict.as_str().to_string())
    }

    fn paint(verdict: Verdict, text: String) -> ColoredString {
        match verdict {
            Verdict::Pass => text.green().bold(),
            Verdict::Concern => text.yellow().bold(),
            Verdict::Block => text.red().bold(),
        }
    }

    fn severity_tag(severity: DisagreementSeverity) -> ColoredString {
        let tag = format!("[{}]", severity);
        match severity {
            DisagreementSeverity::High => tag.red().bold(),
            DisagreementSeverity::Medium => tag.yellow(),
            DisagreementSeverity::Low => tag.normal(),
        }
    }

    fn section_header(title: &str) -> String {
        format!("{}\n\n", format!("## {}", title).cyan().bold())
    }
}

impl ReportFormatter for ConsoleFormatter {
    fn format(&self, review: &AggregateReview) -> String {
        Self::format(review)
    }

    fn format_json(&self, review: &AggregateReview) -> String {
        Self::format_json(review)
    }

    fn format_summary(&self, review: &AggregateReview) -> String {
        Self::format_summary(review)
    }
}
