//! Source payloads and merge policy.
//!
//! Search fan-out returns hits in arbitrary order; everything here runs
//! after the batch join, on the single owner of the task's source list.

use super::entities::SourceInfo;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One search engine hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
}

impl SearchHit {
    pub fn new(url: impl Into<String>, title: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            snippet: snippet.into(),
            publish_date: None,
        }
    }
}

/// Text extracted from a single page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedPage {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
}

/// A page reached by crawling from a root URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawledPage {
    pub url: String,
    pub title: String,
    pub content: String,
    pub depth: usize,
}

const SUB_QUESTION_WEIGHT: f64 = 0.9;
const PRIMARY_QUERY_BONUS: f64 = 0.1;

/// Rank-derived relevance in `[0, 1]`.
///
/// Hits for the user's own query get a small bonus; hits for derived
/// sub-questions are scaled down slightly.
pub fn relevance_for_rank(rank: usize, primary_query: bool) -> f64 {
    let base = 1.0 / (1.0 + rank as f64);
    let score = if primary_query {
        base + PRIMARY_QUERY_BONUS
    } else {
        base * SUB_QUESTION_WEIGHT
    };
    score.clamp(0.0, 1.0)
}

/// Host of `url` without a leading `www.`; the raw string when unparseable.
pub fn domain_of(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) => parsed
            .host_str()
            .map(|h| h.strip_prefix("www.").unwrap_or(h).to_string())
            .unwrap_or_else(|| url.to_string()),
        Err(_) => url.to_string(),
    }
}

impl SourceInfo {
    /// Unscraped source built from a search hit; content is the snippet.
    pub fn from_hit(hit: SearchHit, relevance_score: f64) -> Self {
        Self {
            domain: domain_of(&hit.url),
            url: hit.url,
            title: hit.title,
            extracted_content: hit.snippet,
            relevance_score: relevance_score.clamp(0.0, 1.0),
            publish_date: hit.publish_date,
            author: None,
            scraped: false,
        }
    }

    /// Apply a successful scrape. Empty page text keeps the snippet.
    pub fn apply_scrape(&mut self, page: ScrapedPage) {
        if !page.content.trim().is_empty() {
            self.extracted_content = page.content;
            self.scraped = true;
        }
        if page.author.is_some() {
            self.author = page.author;
        }
        if self.publish_date.is_none() {
            self.publish_date = page.publish_date;
        }
    }
}

/// Merge one query's hits into `sources`, deduplicating by exact URL and
/// stopping at `max_sources`. Returns the number of sources added.
///
/// A URL seen again keeps its first entry but takes the higher relevance.
pub fn merge_hits(
    sources: &mut Vec<SourceInfo>,
    hits: Vec<SearchHit>,
    primary_query: bool,
    max_sources: usize,
) -> usize {
    let mut seen: HashSet<String> = sources.iter().map(|s| s.url.clone()).collect();
    let mut added = 0;

    for (rank, hit) in hits.into_iter().enumerate() {
        if hit.url.trim().is_empty() {
            continue;
        }
        let score = relevance_for_rank(rank, primary_query);
        if seen.contains(&hit.url) {
            if let Some(existing) = sources.iter_mut().find(|s| s.url == hit.url)
                && score > existing.relevance_score
            {
                existing.relevance_score = score;
            }
            continue;
        }
        if sources.len() >= max_sources {
            continue;
        }
        seen.insert(hit.url.clone());
        sources.push(SourceInfo::from_hit(hit, score));
        added += 1;
    }

    added
}

/// Stable sort by relevance, highest first.
pub fn rank_sources(sources: &mut [SourceInfo]) {
    sources.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(url: &str) -> SearchHit {
        SearchHit::new(url, format!("title {url}"), format!("snippet {url}"))
    }

    fn urls(sources: &[SourceInfo]) -> Vec<&str> {
        sources.iter().map(|s| s.url.as_str()).collect()
    }

    #[test]
    fn test_merge_dedups_by_exact_url() {
        let mut sources = Vec::new();
        merge_hits(&mut sources, vec![hit("https://a.com/1"), hit("https://b.com/1")], true, 10);
        let added = merge_hits(
            &mut sources,
            vec![hit("https://a.com/1"), hit("https://c.com/1")],
            false,
            10,
        );
        assert_eq!(added, 1);
        assert_eq!(urls(&sources), vec!["https://a.com/1", "https://b.com/1", "https://c.com/1"]);
    }

    #[test]
    fn test_merge_respects_cap() {
        let mut sources = Vec::new();
        let hits = (0..8).map(|i| hit(&format!("https://x.com/{i}"))).collect();
        assert_eq!(merge_hits(&mut sources, hits, true, 5), 5);
        assert_eq!(sources.len(), 5);
        assert_eq!(merge_hits(&mut sources, vec![hit("https://y.com")], true, 5), 0);
    }

    #[test]
    fn test_merge_order_independent_set() {
        let first = vec![hit("https://a.com"), hit("https://b.com")];
        let second = vec![hit("https://b.com"), hit("https://c.com")];

        let mut ab = Vec::new();
        merge_hits(&mut ab, first.clone(), false, 10);
        merge_hits(&mut ab, second.clone(), false, 10);

        let mut ba = Vec::new();
        merge_hits(&mut ba, second, false, 10);
        merge_hits(&mut ba, first, false, 10);

        let mut left = urls(&ab);
        let mut right = urls(&ba);
        left.sort();
        right.sort();
        assert_eq!(left, right);
    }

    #[test]
    fn test_duplicate_keeps_higher_relevance() {
        let mut sources = Vec::new();
        merge_hits(&mut sources, vec![hit("https://z.com"), hit("https://a.com")], false, 10);
        let before = sources[1].relevance_score;
        merge_hits(&mut sources, vec![hit("https://a.com")], true, 10);
        assert!(sources[1].relevance_score > before);
        assert_eq!(sources.len(), 2);
    }

    #[test]
    fn test_relevance_bounds() {
        assert_eq!(relevance_for_rank(0, true), 1.0);
        assert!(relevance_for_rank(0, false) < 1.0);
        assert!(relevance_for_rank(1, true) > relevance_for_rank(1, false));
        for rank in 0..50 {
            let s = relevance_for_rank(rank, rank % 2 == 0);
            assert!((0.0..=1.0).contains(&s));
        }
    }

    #[test]
    fn test_rank_sources_is_stable() {
        let mut sources = vec![
            SourceInfo::from_hit(hit("https://a.com"), 0.5),
            SourceInfo::from_hit(hit("https://b.com"), 0.9),
            SourceInfo::from_hit(hit("https://c.com"), 0.5),
        ];
        rank_sources(&mut sources);
        assert_eq!(urls(&sources), vec!["https://b.com", "https://a.com", "https://c.com"]);
    }

    #[test]
    fn test_domain_of() {
        assert_eq!(domain_of("https://www.rust-lang.org/learn"), "rust-lang.org");
        assert_eq!(domain_of("http://docs.rs:8080/tokio"), "docs.rs");
        assert_eq!(domain_of("not a url"), "not a url");
    }

    #[test]
    fn test_apply_scrape_keeps_snippet_on_empty_page() {
        let mut source = SourceInfo::from_hit(hit("https://a.com"), 1.0);
        source.apply_scrape(ScrapedPage::default());
        assert!(!source.scraped);
        assert_eq!(source.extracted_content, "snippet https://a.com");

        source.apply_scrape(ScrapedPage {
            content: "full text".into(),
            author: Some("Ferris".into()),
            publish_date: None,
        });
        assert!(source.scraped);
        assert_eq!(source.extracted_content, "full text");
        assert_eq!(source.author.as_deref(), Some("Ferris"));
    }
}
