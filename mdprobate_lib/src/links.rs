//! Detail-page links on a results page, and the deduplicated set they
//! accumulate into across pages.

use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

use crate::html::selector;

static RESULT_ROWS: LazyLock<Selector> = LazyLock::new(|| selector("#dgSearchResults tr"));
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| selector("a"));

/// Links that trigger a postback instead of navigating.
fn is_postback_link(href: &str) -> bool {
    href.to_ascii_lowercase().contains("javascript:")
}

/// Resolves a result href against the results directory.
pub fn resolve_link(base: &Url, href: &str) -> Option<String> {
    match base.join(href.trim()) {
        Ok(url) => Some(url.to_string()),
        Err(e) => {
            tracing::debug!("Skipping unresolvable link {:?}: {}", href, e);
            None
        }
    }
}

/// Collects the first link of every results row, skipping postback links,
/// resolved to absolute URLs in page order. Duplicates are kept here; the
/// [`DiscoveredUrls`] set collapses them.
pub fn result_links(doc: &Html, base: &Url) -> Vec<String> {
    doc.select(&RESULT_ROWS)
        .filter_map(|row| row.select(&ANCHOR).next())
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter(|href| !is_postback_link(href))
        .filter_map(|href| resolve_link(base, href))
        .collect()
}

/// Insertion-ordered set of detail URLs.
///
/// Grows monotonically while pages are walked. Iteration is in
/// first-discovered order, so truncating to a record limit is deterministic.
#[derive(Debug, Clone, Default)]
pub struct DiscoveredUrls {
    urls: Vec<String>,
    seen: HashSet<String>,
}

impl DiscoveredUrls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a URL, returning `false` if it was already present.
    pub fn insert(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if self.seen.contains(&url) {
            return false;
        }
        self.seen.insert(url.clone());
        self.urls.push(url);
        true
    }

    /// Adds every URL, returning how many were new.
    pub fn merge<I>(&mut self, urls: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        urls.into_iter().filter(|url| self.insert(url.as_str())).count()
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(String::as_str)
    }

    /// The first `limit` URLs in discovery order, or all of them.
    pub fn into_limited(self, limit: Option<usize>) -> Vec<String> {
        let mut urls = self.urls;
        if let Some(limit) = limit {
            urls.truncate(limit);
        }
        urls
    }
}

impl FromIterator<String> for DiscoveredUrls {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = DiscoveredUrls::new();
        set.merge(iter);
        set
    }
}
