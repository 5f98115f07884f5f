//! Web source provider: search, scrape, and same-host crawl.
//!
//! | Operation | Backend | Key dependency |
//! |-----------|---------|----------------|
//! | `search` | DuckDuckGo Instant Answer API | `reqwest` |
//! | `scrape` | page fetch + readable-text extraction | `reqwest` + `scraper` |
//! | `crawl` | breadth-first over same-host links | `url` |
//!
//! The Instant Answer API needs no key but returns topic links rather
//! than a full result listing, so hit counts are often small. Any richer
//! search backend can replace this by implementing
//! [`SourceProvider`](deepdive_application::SourceProvider).

mod html;
mod search;
mod web;

pub use html::{ExtractedPage, extract_page, html_to_text};
pub use web::{WebSourceConfig, WebSourceProvider};
