//! Port for structured research event logging.
//!
//! Separate from `tracing`: tracing carries human-readable diagnostics,
//! while this port records a machine-readable trail of a research run
//! (one record per event, e.g. JSONL).

use serde_json::Value;

/// A structured research event.
pub struct ResearchEvent {
    /// Event type identifier (`phase_started`, `partial_failure`, ...).
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ResearchEvent {
    pub const PHASE_STARTED: &'static str = "phase_started";
    pub const PHASE_COMPLETED: &'static str = "phase_completed";
    pub const PARTIAL_FAILURE: &'static str = "partial_failure";
    pub const RESEARCH_COMPLETED: &'static str = "research_completed";
    pub const RESEARCH_FAILED: &'static str = "research_failed";

    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging research events.
///
/// `log` is synchronous and infallible; write failures are the
/// implementation's problem and must not disturb the run.
pub trait ResearchEventLogger: Send + Sync {
    fn log(&self, event: ResearchEvent);
}

/// No-op implementation for tests and when event logging is disabled.
pub struct NoEventLogger;

impl ResearchEventLogger for NoEventLogger {
    fn log(&self, _event: ResearchEvent) {}
}
