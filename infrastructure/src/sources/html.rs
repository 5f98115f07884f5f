//! Readable-text extraction from HTML.

use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

/// Tags whose entire subtree is ignored.
const SKIP_TAGS: [&str; 6] = ["script", "style", "noscript", "svg", "nav", "footer"];

/// Everything the provider needs from one HTML page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedPage {
    pub title: String,
    pub text: String,
    pub author: Option<String>,
    pub publish_date: Option<String>,
    /// Absolute http(s) links, fragments removed, in document order.
    pub links: Vec<String>,
}

/// Extract readable text from HTML, stripping tags, scripts, and styles.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    body_text(&document)
}

/// Parse a page once and pull out text, metadata, and outgoing links.
///
/// Relative links are resolved against `base`.
pub fn extract_page(html: &str, base: &Url) -> ExtractedPage {
    let document = Html::parse_document(html);

    let title = select_first(&document, "title")
        .map(|el| clean_whitespace(&el.text().collect::<String>()))
        .unwrap_or_default();

    let author = meta_content(&document, &["meta[name=\"author\"]", "meta[property=\"article:author\"]"]);
    let publish_date = meta_content(
        &document,
        &[
            "meta[property=\"article:published_time\"]",
            "meta[name=\"date\"]",
            "meta[name=\"pubdate\"]",
        ],
    )
    .or_else(|| {
        select_first(&document, "time[datetime]")
            .and_then(|el| el.value().attr("datetime"))
            .map(str::to_string)
    });

    ExtractedPage {
        title,
        text: body_text(&document),
        author,
        publish_date,
        links: links(&document, base),
    }
}

fn body_text(document: &Html) -> String {
    let root = select_first(document, "body").unwrap_or_else(|| document.root_element());
    let parts = collect_element_text(root);
    clean_whitespace(&parts.join(" "))
}

fn select_first<'a>(document: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(selector).ok()?;
    document.select(&selector).next()
}

fn meta_content(document: &Html, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|s| {
        select_first(document, s)
            .and_then(|el| el.value().attr("content"))
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
    })
}

fn links(document: &Html, base: &Url) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut out: Vec<String> = Vec::new();
    for el in document.select(&selector) {
        let Some(href) = el.value().attr("href") else {
            continue;
        };
        let Ok(mut resolved) = base.join(href.trim()) else {
            continue;
        };
        if !matches!(resolved.scheme(), "http" | "https") {
            continue;
        }
        resolved.set_fragment(None);
        let link = resolved.to_string();
        if !out.contains(&link) {
            out.push(link);
        }
    }
    out
}

/// Recursively collect text, skipping [`SKIP_TAGS`] subtrees.
fn collect_element_text(element: ElementRef) -> Vec<String> {
    if SKIP_TAGS.contains(&element.value().name()) {
        return Vec::new();
    }

    let mut parts = Vec::new();
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let t = text.trim();
                if !t.is_empty() {
                    parts.push(t.to_string());
                }
            }
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    parts.extend(collect_element_text(child_el));
                }
            }
            _ => {}
        }
    }
    parts
}

/// Collapse runs of spaces; keep at most one blank line.
fn clean_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev_was_whitespace = false;
    let mut newline_count = 0;

    for ch in text.chars() {
        if ch == '\n' {
            newline_count += 1;
            if newline_count <= 2 {
                result.push('\n');
            }
            prev_was_whitespace = true;
        } else if ch.is_whitespace() {
            if !prev_was_whitespace {
                result.push(' ');
            }
            prev_was_whitespace = true;
            newline_count = 0;
        } else {
            result.push(ch);
            prev_was_whitespace = false;
            newline_count = 0;
        }
    }

    result.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/blog/post").unwrap()
    }

    #[test]
    fn test_html_to_text_strips_script_and_style() {
        let html = r#"
        <html><body>
            <script>var x = 1;</script>
            <style>.foo { color: red; }</style>
            <nav>Home | About</nav>
            <p>Visible text</p>
            <noscript>No JS</noscript>
        </body></html>
        "#;
        let text = html_to_text(html);
        assert_eq!(text, "Visible text");
    }

    #[test]
    fn test_html_to_text_empty() {
        assert!(html_to_text("").trim().is_empty());
    }

    #[test]
    fn test_extract_metadata() {
        let html = r#"<html><head>
            <title>  Rust   2024 </title>
            <meta name="author" content="Ferris">
            <meta property="article:published_time" content="2024-02-01T00:00:00Z">
        </head><body><h1>Hello</h1><p>World</p></body></html>"#;

        let page = extract_page(html, &base());
        assert_eq!(page.title, "Rust 2024");
        assert_eq!(page.author.as_deref(), Some("Ferris"));
        assert_eq!(page.publish_date.as_deref(), Some("2024-02-01T00:00:00Z"));
        assert!(page.text.contains("Hello"));
        assert!(page.text.contains("World"));
    }

    #[test]
    fn test_extract_time_element_date() {
        let html = r#"<body><time datetime="2023-05-06">May 6</time></body>"#;
        let page = extract_page(html, &base());
        assert_eq!(page.publish_date.as_deref(), Some("2023-05-06"));
        assert!(page.author.is_none());
    }

    #[test]
    fn test_links_resolved_and_deduped() {
        let html = r##"<body>
            <a href="/about">About</a>
            <a href="next#comments">Next</a>
            <a href="next">Next again</a>
            <a href="mailto:me@example.com">Mail</a>
            <a href="https://other.org/x">Other</a>
        </body>"##;
        let page = extract_page(html, &base());
        assert_eq!(
            page.links,
            vec![
                "https://example.com/about",
                "https://example.com/blog/next",
                "https://other.org/x",
            ]
        );
    }

    #[test]
    fn test_clean_whitespace() {
        assert_eq!(clean_whitespace("  hello   world  "), "hello world");
        assert_eq!(clean_whitespace("a\n\n\n\nb"), "a\n\nb");
    }
}
