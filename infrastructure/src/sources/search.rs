//! DuckDuckGo Instant Answer response parsing.

use deepdive_domain::SearchHit;
use serde_json::Value;

/// Instant Answer API endpoint (no API key required).
pub(super) const DDG_API_URL: &str = "https://api.duckduckgo.com/";

/// Turn an Instant Answer payload into ranked hits.
///
/// Order: the abstract (if it has a source URL), then `Results`, then
/// `RelatedTopics` with nested topic groups flattened. Duplicate URLs
/// keep their first position.
pub(super) fn parse_instant_answer(data: &Value, max_results: usize) -> Vec<SearchHit> {
    let mut hits: Vec<SearchHit> = Vec::new();
    let mut push = |hit: SearchHit| {
        if hits.len() < max_results && !hits.iter().any(|h| h.url == hit.url) {
            hits.push(hit);
        }
    };

    if let Some(url) = non_empty(&data["AbstractURL"])
        && let Some(text) = non_empty(&data["AbstractText"])
    {
        let title = non_empty(&data["Heading"])
            .or_else(|| non_empty(&data["AbstractSource"]))
            .unwrap_or(url);
        push(SearchHit::new(url, title, text));
    }

    for topic in data["Results"].as_array().into_iter().flatten() {
        if let Some(hit) = topic_hit(topic) {
            push(hit);
        }
    }

    for topic in data["RelatedTopics"].as_array().into_iter().flatten() {
        match topic["Topics"].as_array() {
            Some(group) => group.iter().filter_map(topic_hit).for_each(&mut push),
            None => {
                if let Some(hit) = topic_hit(topic) {
                    push(hit);
                }
            }
        }
    }

    hits
}

fn topic_hit(topic: &Value) -> Option<SearchHit> {
    let url = non_empty(&topic["FirstURL"])?;
    let text = non_empty(&topic["Text"])?;
    // Topic text reads "Title - description".
    let title = text.split_once(" - ").map_or(text, |(title, _)| title);
    Some(SearchHit::new(url, title.trim(), text))
}

fn non_empty(value: &Value) -> Option<&str> {
    value.as_str().map(str::trim).filter(|s| !s.is_empty())
}
