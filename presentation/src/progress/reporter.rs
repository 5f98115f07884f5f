//! Progress reporting for research execution

use colored::Colorize;
use deepdive_application::ResearchProgressNotifier;
use deepdive_domain::ResearchState;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Reports progress during a research run with progress bars
pub struct ProgressReporter {
    multi: MultiProgress,
    phase_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            phase_bar: Mutex::new(None),
        }
    }

    fn phase_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn phase_display_name(phase: ResearchState) -> &'static str {
        match phase {
            ResearchState::Planning => "Phase 1: Planning",
            ResearchState::Searching => "Phase 2: Searching",
            ResearchState::Extracting => "Phase 3: Extracting",
            ResearchState::Verifying => "Phase 4: Verifying",
            ResearchState::Synthesizing => "Phase 5: Synthesizing",
            other => other.display_name(),
        }
    }

    fn tick(&self, label: &str, success: bool) {
        if let Ok(guard) = self.phase_bar.lock()
            && let Some(pb) = guard.as_ref()
        {
            let status = if success {
                format!("{} {}", "v".green(), label)
            } else {
                format!("{} {}", "x".red(), label)
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResearchProgressNotifier for ProgressReporter {
    fn on_phase_start(&self, phase: ResearchState, total_tasks: usize) {
        let pb = self.multi.add(ProgressBar::new(total_tasks as u64));
        pb.set_style(Self::phase_style());
        pb.set_prefix(Self::phase_display_name(phase).to_string());
        pb.set_message("Starting...");

        if let Ok(mut slot) = self.phase_bar.lock() {
            *slot = Some(pb);
        }
    }

    fn on_phase_complete(&self, phase: ResearchState, summary: &str) {
        let Ok(mut slot) = self.phase_bar.lock() else {
            return;
        };
        if let Some(pb) = slot.take() {
            // Router phases report one task and never tick.
            pb.set_position(pb.length().unwrap_or(0));
            pb.finish_with_message(format!("{} {}", phase.display_name().green(), summary));
        }
    }

    fn on_query_complete(&self, query: &str, success: bool) {
        self.tick(query, success);
    }

    fn on_source_scraped(&self, url: &str, success: bool) {
        self.tick(url, success);
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ResearchProgressNotifier for SimpleProgress {
    fn on_phase_start(&self, phase: ResearchState, total_tasks: usize) {
        eprintln!(
            "{} {} ({} tasks)",
            "->".cyan(),
            ProgressReporter::phase_display_name(phase).bold(),
            total_tasks
        );
    }

    fn on_phase_complete(&self, _phase: ResearchState, summary: &str) {
        eprintln!("   {}", summary.dimmed());
    }

    fn on_query_complete(&self, query: &str, success: bool) {
        if success {
            eprintln!("  {} {}", "v".green(), query);
        } else {
            eprintln!("  {} {} (failed)", "x".red(), query);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_names_are_numbered() {
        assert_eq!(
            ProgressReporter::phase_display_name(ResearchState::Searching),
            "Phase 2: Searching"
        );
        assert_eq!(
            ProgressReporter::phase_display_name(ResearchState::Completed),
            "Completed"
        );
    }

    #[test]
    fn test_reporter_survives_a_full_run() {
        let reporter = ProgressReporter::new();
        reporter.on_phase_start(ResearchState::Searching, 2);
        reporter.on_query_complete("q1", true);
        reporter.on_query_complete("q2", false);
        reporter.on_phase_complete(ResearchState::Searching, "4 sources");
        assert!(reporter.phase_bar.lock().unwrap().is_none());

        // Ticks outside a phase are ignored.
        reporter.on_source_scraped("https://example.com", true);
    }
}
