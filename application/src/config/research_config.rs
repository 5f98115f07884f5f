//! Research pipeline parameters: fan-out widths and content budgets.

use deepdive_domain::ResearchRequest;

/// Research pipeline parameters.
///
/// `max_sources` caps sources for requests that do not set
/// [`ResearchRequest::max_sources`] themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchConfig {
    pub max_sources: usize,
    /// Concurrent searches per batch.
    pub search_batch_size: usize,
    pub results_per_query: usize,
    /// Sources scraped in full during extraction.
    pub scrape_top_n: usize,
    /// Byte budget for source text sent to verification and synthesis.
    pub verification_content_limit: usize,
    pub per_source_content_limit: usize,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            max_sources: ResearchRequest::DEFAULT_MAX_SOURCES,
            search_batch_size: 3,
            results_per_query: 5,
            scrape_top_n: 6,
            verification_content_limit: 12_000,
            per_source_content_limit: 2_000,
        }
    }
}

impl ResearchConfig {
    // ==================== Builder Methods ====================

    pub fn with_max_sources(mut self, max: usize) -> Self {
        self.max_sources = max;
        self
    }

    pub fn with_search_batch_size(mut self, size: usize) -> Self {
        self.search_batch_size = size;
        self
    }

    pub fn with_results_per_query(mut self, n: usize) -> Self {
        self.results_per_query = n;
        self
    }

    pub fn with_scrape_top_n(mut self, n: usize) -> Self {
        self.scrape_top_n = n;
        self
    }

    pub fn with_content_limits(mut self, total: usize, per_source: usize) -> Self {
        self.verification_content_limit = total;
        self.per_source_content_limit = per_source;
        self
    }
}
