//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `VisitedSet`: normalized URLs already claimed for fetching
//! - `CrawlState`: the visited set plus URLs whose expansion is still pending

mod crawl_state;
mod visited;

// Re-export main types
pub use crawl_state::CrawlState;
pub use visited::VisitedSet;
