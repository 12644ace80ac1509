use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Set of normalized URLs that have been claimed for fetching
///
/// The set only grows: there is no removal API. Claiming happens before the
/// fetch, so a URL present here is never fetched again by the same crawl.
/// Serializes as a sorted JSON list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisitedSet(BTreeSet<String>);

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `url`, returning true if it was not yet present
    pub fn insert(&mut self, url: impl Into<String>) -> bool {
        self.0.insert(url.into())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.0.contains(url)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl FromIterator<String> for VisitedSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a str> for VisitedSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(iter.into_iter().map(str::to_string).collect())
    }
}

impl IntoIterator for VisitedSet {
    type Item = String;
    type IntoIter = std::collections::btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
