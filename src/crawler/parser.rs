//! HTML parser for extracting hyperlinks
//!
//! Every `<a href>` target is resolved against the page URL. Special schemes
//! and same-page anchors are dropped here; domain and extension filtering is
//! left to the caller.

use scraper::{Html, Selector};
use url::Url;

/// Extracts all hyperlink targets from an HTML document as absolute URLs
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` anywhere in the document, relative or absolute
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links (`#section`)
/// - Anything that does not resolve to an http(s) URL
///
/// # Example
///
/// ```
/// use polite_crawl::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/ec2/">EC2</a></body></html>"#;
/// let base_url = Url::parse("https://aws.amazon.com/products").unwrap();
/// assert_eq!(extract_links(html, &base_url), vec!["https://aws.amazon.com/ec2/"]);
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only and empty hrefs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    match absolute_url.scheme() {
        "http" | "https" => Some(absolute_url.to_string()),
        _ => None,
    }
}
