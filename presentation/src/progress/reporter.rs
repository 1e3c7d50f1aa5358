//! Progress reporting for review execution

use codequorum_application::ReviewProgressNotifier;
use codequorum_domain::Verdict;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::Mutex;

/// Reports progress with a progress bar, one tick per completed model
pub struct ProgressReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn review_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn model_status(model: &str, gate: Verdict, success: bool) -> String {
        if !success {
            return format!("{} {} (failed)", "x".red(), model);
        }
        match gate {
            Verdict::Pass => format!("{} {} {}", "v".green(), model, gate.as_str().green()),
            Verdict::Concern => format!("{} {} {}", "v".green(), model, gate.as_str().yellow()),
            Verdict::Block => format!("{} {} {}", "v".green(), model, gate.as_str().red()),
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReviewProgressNotifier for ProgressReporter {
    fn on_review_start(&self, models: &[String]) {
        let pb = ProgressBar::with_draw_target(
            Some(models.len() as u64),
            ProgressDrawTarget::stderr(),
        );
        pb.set_style(Self::review_style());
        pb.set_prefix("Reviewing");
        pb.set_message(models.join(", "));

        if let Ok(mut slot) = self.bar.lock() {
            *slot = Some(pb);
        }
    }

    fn on_model_complete(&self, model: &str, gate: Verdict, success: bool) {
        if let Ok(slot) = self.bar.lock()
            && let Some(pb) = slot.as_ref()
        {
            pb.set_message(Self::model_status(model, gate, success));
            pb.inc(1);
        }
    }

    fn on_review_complete(&self, gate: Verdict) {
        if let Ok(mut slot) = self.bar.lock()
            && let Some(pb) = slot.take()
        {
            pb.finish_with_message(format!("{} {}", "Review complete:".green(), gate));
        }
    }
}

/// Simple text-based progress on stderr (no bar)
pub struct SimpleProgress;

impl ReviewProgressNotifier for SimpleProgress {
    fn on_review_start(&self, models: &[String]) {
        eprintln!("{} Running review with {}...", "->".cyan(), models.join(", "));
    }

    fn on_model_complete(&self, model: &str, gate: Verdict, success: bool) {
        eprintln!("  {}", ProgressReporter::model_status(model, gate, success));
    }

    fn on_review_complete(&self, _gate: Verdict) {
        eprintln!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reporter_lifecycle() {
        let reporter = ProgressReporter::new();
        let models = vec!["claude".to_string(), "gemini".to_string()];

        reporter.on_review_start(&models);
        reporter.on_model_complete("claude", Verdict::Pass, true);
        {
            let slot = reporter.bar.lock().unwrap();
            let pb = slot.as_ref().unwrap();
            assert_eq!(pb.length(), Some(2));
            assert_eq!(pb.position(), 1);
        }
        reporter.on_model_complete("gemini", Verdict::Block, false);
        reporter.on_review_complete(Verdict::Block);

        assert!(reporter.bar.lock().unwrap().is_none());
    }

    #[test]
    fn test_complete_without_start_is_noop() {
        let reporter = ProgressReporter::default();
        reporter.on_model_complete("claude", Verdict::Pass, true);
        reporter.on_review_complete(Verdict::Pass);
        assert!(reporter.bar.lock().unwrap().is_none());
    }

    #[test]
    fn test_model_status() {
        colored::control::set_override(false);
        assert_eq!(
            ProgressReporter::model_status("claude", Verdict::Concern, true),
            "v claude CONCERN"
        );
        assert_eq!(
            ProgressReporter::model_status("gemini", Verdict::Block, false),
            "x gemini (failed)"
        );
    }
}
