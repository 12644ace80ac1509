use crate::{UrlError, UrlResult};
use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host (which shouldn't happen for valid HTTP(S) URLs), it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use polite_crawl::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("https://sub.example.com/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("sub.example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Parses a seed URL, accepting only absolute http/https URLs with a host
pub fn parse_http_url(url_str: &str) -> UrlResult<Url> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    Ok(url)
}

/// Derives the base domain a crawl from `seed` is restricted to
///
/// # Examples
///
/// ```
/// use polite_crawl::url::base_domain;
///
/// assert_eq!(base_domain("https://aws.amazon.com/ec2/").unwrap(), "aws.amazon.com");
/// assert!(base_domain("ftp://aws.amazon.com/").is_err());
/// ```
pub fn base_domain(seed: &str) -> UrlResult<String> {
    let url = parse_http_url(seed)?;
    extract_domain(&url).ok_or(UrlError::MissingDomain)
}
