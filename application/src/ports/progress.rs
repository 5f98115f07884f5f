//! Progress notification port
//!
//! Defines the interface for reporting progress during a research run.

use deepdive_domain::ResearchState;

/// Callback for progress updates during a research run
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (spinner, plain log lines, etc.)
pub trait ResearchProgressNotifier: Send + Sync {
    /// Called when a phase starts. `total_tasks` is the number of
    /// queries or pages the phase will fan out to (1 for router phases).
    fn on_phase_start(&self, phase: ResearchState, total_tasks: usize);

    /// Called when a phase completes
    fn on_phase_complete(&self, phase: ResearchState, summary: &str);

    /// Called when one search query finishes
    fn on_query_complete(&self, _query: &str, _success: bool) {}

    /// Called when one page scrape finishes
    fn on_source_scraped(&self, _url: &str, _success: bool) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ResearchProgressNotifier for NoProgress {
    fn on_phase_start(&self, _phase: ResearchState, _total_tasks: usize) {}
    fn on_phase_complete(&self, _phase: ResearchState, _summary: &str) {}
}
