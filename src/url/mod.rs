//! URL handling module for polite-crawl
//!
//! This module provides URL normalization, the crawl frontier filter, and the
//! host matching both rely on. Everything here is pure: no network access.

mod domain;
mod filter;
mod matcher;
mod normalize;

// Re-export main functions
pub use domain::{base_domain, extract_domain, parse_http_url};
pub use filter::is_valid;
pub use matcher::is_same_or_subdomain;
pub use normalize::normalize;
