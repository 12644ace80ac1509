/// Checks whether `host` is `base` itself or one of its subdomains
///
/// The match is made on a label boundary, so `notexample.com` is not a
/// subdomain of `example.com`. Both arguments are compared case-insensitively.
///
/// # Examples
///
/// ```
/// use polite_crawl::url::is_same_or_subdomain;
///
/// assert!(is_same_or_subdomain("aws.amazon.com", "aws.amazon.com"));
/// assert!(is_same_or_subdomain("docs.aws.amazon.com", "aws.amazon.com"));
/// assert!(!is_same_or_subdomain("amazon.com", "aws.amazon.com"));
/// assert!(!is_same_or_subdomain("fakeaws.amazon.com", "aws.amazon.com"));
/// ```
pub fn is_same_or_subdomain(host: &str, base: &str) -> bool {
    if host.is_empty() || base.is_empty() {
        return false;
    }

    let host = host.to_ascii_lowercase();
    let base = base.to_ascii_lowercase();
    let base = base.trim_end_matches('.');

    host == base || host.ends_with(&format!(".{}", base))
}
