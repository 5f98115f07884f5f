//! Source provider port
//!
//! Web search, page scraping, and crawling consumed by the research
//! pipeline. Raw SERP and HTML handling belong to implementations.

use async_trait::async_trait;
use deepdive_domain::{CrawledPage, ScrapedPage, SearchHit};
use thiserror::Error;

/// Errors from a source provider call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("HTTP {status}")]
    Http { status: u16 },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Response too large: {0} bytes")]
    TooLarge(usize),
}

#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// Search the web. Hits are ordered best first.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, SourceError>;

    /// Extract readable text from one page.
    async fn scrape(&self, url: &str) -> Result<ScrapedPage, SourceError>;

    /// Breadth-first crawl from `root`, staying on its host.
    async fn crawl(
        &self,
        root: &str,
        max_depth: usize,
        max_pages: usize,
    ) -> Result<Vec<CrawledPage>, SourceError>;
}
