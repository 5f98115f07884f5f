//! Research pipeline domain.
//!
//! - [`entities`] — [`ResearchTask`](entities::ResearchTask) and what it accumulates
//! - [`request`] — pipeline entry/exit contract
//! - [`source`] — search/scrape/crawl payloads and URL-deduplicating merge
//! - [`parsing`] — structured-output recovery for planning and verification

pub mod entities;
pub mod parsing;
pub mod request;
pub mod source;
