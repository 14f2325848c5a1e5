//! HTML parser for extracting links
//!
//! This module parses fetched bodies into documents and extracts the links
//! to follow (from `<a href>` anchors).

use crate::url::{base_url, to_absolute_url};
use scraper::{Html, Selector};
use std::collections::HashSet;

/// Parses an HTML body into a queryable document
pub fn parse_document(body: &str) -> Html {
    Html::parse_document(body)
}

/// Extracts every followable link on a page as an absolute address
///
/// Relative references are resolved against the base of `address`
/// (`scheme://host[:port]`), not against the page's own path.
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` anywhere in the document
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links (same page anchors)
/// - Anything that does not resolve to an HTTP(S) address
///
/// # Example
///
/// ```
/// use tiercrawl::crawler::{extract_links, parse_document};
///
/// let html = r#"<html><body><a href="/page">Link</a></body></html>"#;
/// let document = parse_document(html);
/// let links = extract_links("https://example.com/some/where", &document);
/// assert!(links.contains("https://example.com/page"));
/// ```
pub fn extract_links(address: &str, document: &Html) -> HashSet<String> {
    let mut links = HashSet::new();

    // Absolute links still resolve without a base
    let base = base_url(address).unwrap_or_default();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&a_selector) {
        if element.value().attr("download").is_some() {
            continue;
        }

        if let Some(href) = element.value().attr("href") {
            if let Some(absolute_url) = resolve_link(&base, href) {
                links.insert(absolute_url);
            }
        }
    }

    links
}

/// Resolves a link href to an absolute address, or `None` if it is excluded
fn resolve_link(base: &str, href: &str) -> Option<String> {
    let href = href.trim();

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
        || href.starts_with('#')
    {
        return None;
    }

    match to_absolute_url(base, href) {
        Ok(absolute_url) => Some(absolute_url),
        Err(e) => {
            tracing::trace!("Skipping link {:?}: {}", href, e);
            None
        }
    }
}
