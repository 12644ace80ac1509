use crate::url::matcher::is_same_or_subdomain;
use url::Url;

/// Decides whether a discovered URL belongs in the crawl frontier
///
/// A URL is kept only when:
/// - it is absolute and uses the `http` or `https` scheme
/// - its host equals `base_domain` or is a subdomain of it
/// - its path does not end in one of `blocked_extensions` (case-insensitive)
///
/// Relative and malformed URLs are rejected. No network access happens here.
///
/// # Examples
///
/// ```
/// use polite_crawl::url::is_valid;
///
/// let blocked = [".pdf", ".jpg", ".png", ".js", ".css"];
/// assert!(is_valid("https://aws.amazon.com/ec2/", "aws.amazon.com", &blocked));
/// assert!(!is_valid("https://example.com", "aws.amazon.com", &blocked));
/// assert!(!is_valid("https://aws.amazon.com/file.pdf", "aws.amazon.com", &blocked));
/// ```
pub fn is_valid<S: AsRef<str>>(url: &str, base_domain: &str, blocked_extensions: &[S]) -> bool {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => return false,
    };

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return false;
    }

    let host = match parsed.host_str() {
        Some(host) => host,
        None => return false,
    };

    if !is_same_or_subdomain(host, base_domain) {
        return false;
    }

    !has_blocked_extension(parsed.path(), blocked_extensions)
}

fn has_blocked_extension<S: AsRef<str>>(path: &str, blocked_extensions: &[S]) -> bool {
    let path = path.to_ascii_lowercase();
    blocked_extensions
        .iter()
        .any(|ext| path.ends_with(&ext.as_ref().to_ascii_lowercase()))
}
