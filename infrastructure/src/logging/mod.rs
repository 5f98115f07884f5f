//! Logging infrastructure: structured research event logging.
//!
//! Provides [`JsonlEventLogger`], a JSONL file writer that implements
//! the [`ResearchEventLogger`](deepdive_application::ResearchEventLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlEventLogger;
