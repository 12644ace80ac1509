use url::Url;

/// Normalizes a URL so syntactically different spellings of one page collapse
///
/// # Normalization Steps
///
/// 1. Parse the URL; malformed input is returned unchanged
/// 2. Remove the fragment (everything after #)
/// 3. Remove the query string
/// 4. Remove every trailing slash, including the root one
///
/// Parsing also lowercases the host and drops default ports, so the result is
/// stable: normalizing twice yields the same string.
///
/// # Examples
///
/// ```
/// use polite_crawl::url::normalize;
///
/// assert_eq!(normalize("https://aws.amazon.com/ec2/?nc=sn#pricing"), "https://aws.amazon.com/ec2");
/// assert_eq!(normalize("https://aws.amazon.com/"), "https://aws.amazon.com");
/// assert_eq!(normalize("not a url"), "not a url");
/// ```
pub fn normalize(url_str: &str) -> String {
    match Url::parse(url_str) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.set_query(None);
            url.as_str().trim_end_matches('/').to_string()
        }
        Err(_) => url_str.to_string(),
    }
}
