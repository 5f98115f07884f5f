//! [`SourceProvider`] over plain HTTP.

use super::html::{ExtractedPage, extract_page};
use super::search::{DDG_API_URL, parse_instant_answer};
use crate::config::FileSourcesConfig;
use async_trait::async_trait;
use deepdive_application::{SourceError, SourceProvider};
use deepdive_domain::{CrawledPage, ScrapedPage, SearchHit};
use std::collections::{HashSet, VecDeque};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Maximum response body size (5 MB)
const MAX_BODY_SIZE: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebSourceConfig {
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl WebSourceConfig {
    pub fn from_file(config: &FileSourcesConfig) -> Self {
        Self {
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            user_agent: config.user_agent.clone(),
        }
    }
}

impl Default for WebSourceConfig {
    fn default() -> Self {
        Self::from_file(&FileSourcesConfig::default())
    }
}

/// Search via DuckDuckGo, scrape and crawl with `reqwest` + `scraper`.
#[derive(Debug, Clone)]
pub struct WebSourceProvider {
    client: reqwest::Client,
}

impl WebSourceProvider {
    pub fn new(config: WebSourceConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        Ok(Self { client })
    }

    /// GET a page and return its text if it is HTML, or the raw body
    /// otherwise, along with the final URL after redirects.
    async fn fetch(&self, url: &Url) -> Result<(Url, Fetched), SourceError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
            });
        }

        if let Some(len) = response.content_length()
            && len > MAX_BODY_SIZE as u64
        {
            return Err(SourceError::TooLarge(len as usize));
        }

        let final_url = response.url().clone();
        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_none_or(|ct| ct.contains("text/html") || ct.contains("application/xhtml"));

        let body = response
            .bytes()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        if body.len() > MAX_BODY_SIZE {
            return Err(SourceError::TooLarge(body.len()));
        }
        let body = String::from_utf8_lossy(&body);

        let fetched = if is_html {
            Fetched::Html(extract_page(&body, &final_url))
        } else {
            Fetched::Text(body.into_owned())
        };
        Ok((final_url, fetched))
    }
}

enum Fetched {
    Html(ExtractedPage),
    Text(String),
}

impl Fetched {
    fn into_page(self) -> ExtractedPage {
        match self {
            Fetched::Html(page) => page,
            Fetched::Text(text) => ExtractedPage {
                text,
                ..Default::default()
            },
        }
    }
}

/// Breadth-first crawl order: same-host links only, each URL at most once,
/// nothing queued past `max_depth`.
#[derive(Debug)]
struct CrawlFrontier {
    host: Option<String>,
    max_depth: usize,
    max_pages: usize,
    visited: HashSet<String>,
    queue: VecDeque<(Url, usize)>,
}

impl CrawlFrontier {
    fn new(root: Url, max_depth: usize, max_pages: usize) -> Self {
        let host = root.host_str().map(str::to_string);
        let visited = HashSet::from([root.to_string()]);
        let queue = VecDeque::from([(root, 0)]);
        Self {
            host,
            max_depth,
            max_pages,
            visited,
            queue,
        }
    }

    /// Next URL and its depth, or `None` once `fetched` reaches the page cap.
    fn next(&mut self, fetched: usize) -> Option<(Url, usize)> {
        if fetched >= self.max_pages {
            return None;
        }
        self.queue.pop_front()
    }

    /// Queue the unseen same-host links of a page found at `depth`.
    /// Returns how many were queued.
    fn enqueue_links(&mut self, links: &[String], depth: usize) -> usize {
        if depth >= self.max_depth {
            return 0;
        }
        let mut queued = 0;
        for link in links {
            let Ok(next) = Url::parse(link) else {
                continue;
            };
            if next.host_str() != self.host.as_deref() {
                continue;
            }
            if self.visited.insert(next.to_string()) {
                self.queue.push_back((next, depth + 1));
                queued += 1;
            }
        }
        queued
    }
}

fn parse_url(raw: &str) -> Result<Url, SourceError> {
    Url::parse(raw).map_err(|e| SourceError::InvalidResponse(format!("invalid url {raw}: {e}")))
}

#[async_trait]
impl SourceProvider for WebSourceProvider {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, SourceError> {
        let response = self
            .client
            .get(DDG_API_URL)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
            });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SourceError::InvalidResponse(e.to_string()))?;

        let hits = parse_instant_answer(&body, max_results);
        debug!(query, hits = hits.len(), "Search complete");
        Ok(hits)
    }

    async fn scrape(&self, url: &str) -> Result<ScrapedPage, SourceError> {
        let (_, fetched) = self.fetch(&parse_url(url)?).await?;
        let page = fetched.into_page();
        Ok(ScrapedPage {
            content: page.text,
            author: page.author,
            publish_date: page.publish_date,
        })
    }

    /// A failing root is an error; failing pages below it are skipped.
    async fn crawl(
        &self,
        root: &str,
        max_depth: usize,
        max_pages: usize,
    ) -> Result<Vec<CrawledPage>, SourceError> {
        let mut frontier = CrawlFrontier::new(parse_url(root)?, max_depth, max_pages);
        let mut pages = Vec::new();

        while let Some((url, depth)) = frontier.next(pages.len()) {
            let (final_url, fetched) = match self.fetch(&url).await {
                Ok(result) => result,
                Err(e) if depth == 0 => return Err(e),
                Err(e) => {
                    warn!(url = %url, error = %e, "Skipping page during crawl");
                    continue;
                }
            };
            let page = fetched.into_page();
            frontier.enqueue_links(&page.links, depth);

            pages.push(CrawledPage {
                url: final_url.to_string(),
                title: page.title,
                content: page.text,
                depth,
            });
        }

        debug!(pages = pages.len(), "Crawl complete");
        Ok(pages)
    }
}
