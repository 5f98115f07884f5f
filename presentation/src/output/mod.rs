//! Output formatting for research reports, router answers, and the registry

pub mod console;
pub mod formatter;
