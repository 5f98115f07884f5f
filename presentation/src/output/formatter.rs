//! Output formatter trait

use crate::cli::commands::OutputFormat;
use deepdive_domain::ResearchResponse;

/// Trait for formatting research responses
pub trait OutputFormatter {
    /// Report followed by a numbered source list
    fn format_markdown(&self, response: &ResearchResponse) -> String;

    /// Format as JSON
    fn format_json(&self, response: &ResearchResponse) -> String;

    /// Report, sources, verified facts, and run metadata
    fn format_full(&self, response: &ResearchResponse) -> String;

    fn render(&self, response: &ResearchResponse, format: OutputFormat) -> String {
        match format {
            OutputFormat::Markdown => self.format_markdown(response),
            OutputFormat::Json => self.format_json(response),
            OutputFormat::Full => self.format_full(response),
        }
    }
}
