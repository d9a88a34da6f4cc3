//! Breadth-first frontier of same-origin URLs
//!
//! The frontier owns the queue of discovered-but-unfetched URLs and the set
//! of every URL it has ever accepted, so a URL is queued at most once per job.
//! Duplicates are detected on the normalized form; the link as written (minus
//! its fragment) is what gets requested.

use crate::url::{
    is_page_candidate, is_same_origin, normalize_url, path_extension, resolve_link,
};
use std::collections::{HashSet, VecDeque};
use url::Url;

/// A URL waiting in the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedUrl {
    /// Normalized URL, the page's identity key
    pub url: Url,

    /// Address to request, as first linked
    pub request_url: Url,
}

/// Same-origin URL queue with a visited set
#[derive(Debug)]
pub struct Frontier {
    /// Origin every accepted URL must share
    origin: Url,

    /// URLs waiting to be fetched, in discovery order
    queue: VecDeque<QueuedUrl>,

    /// URLs ever accepted (queued or already dequeued)
    seen: HashSet<String>,

    /// URLs handed out by `dequeue_next`
    visited: HashSet<String>,

    /// Number of URLs accepted so far
    discovered_count: usize,

    /// Extensions handled as documents rather than pages
    document_extensions: HashSet<String>,
}

impl Frontier {
    /// Creates an empty frontier confined to the origin of `origin`
    pub fn new(origin: Url) -> Self {
        Self {
            origin,
            queue: VecDeque::new(),
            seen: HashSet::new(),
            visited: HashSet::new(),
            discovered_count: 0,
            document_extensions: HashSet::new(),
        }
    }

    /// Excludes links with these extensions from the frontier
    pub fn with_document_extensions(mut self, extensions: &[String]) -> Self {
        self.document_extensions = extensions
            .iter()
            .map(|ext| ext.to_ascii_lowercase())
            .collect();
        self
    }

    /// Offers a link to the frontier
    ///
    /// Relative links are resolved against the origin. The URL is dropped
    /// without error if it is malformed, not HTTP(S), cross-origin, points
    /// at a non-page resource, or has been seen before.
    ///
    /// # Returns
    ///
    /// `true` if the URL was newly queued (and counted as discovered)
    pub fn enqueue(&mut self, link: &str) -> bool {
        let url = match resolve_link(&self.origin, link) {
            Ok(url) => url,
            Err(e) => {
                tracing::trace!("Dropping link {}: {}", link, e);
                return false;
            }
        };
        self.enqueue_url(url)
    }

    /// Offers an already-parsed URL to the frontier
    pub fn enqueue_url(&mut self, mut request_url: Url) -> bool {
        let url = match normalize_url(request_url.as_str()) {
            Ok(url) => url,
            Err(e) => {
                tracing::trace!("Dropping link {}: {}", request_url, e);
                return false;
            }
        };
        request_url.set_fragment(None);

        if !is_same_origin(&url, &self.origin) {
            tracing::trace!("Dropping cross-origin link {}", url);
            return false;
        }

        let is_document = path_extension(&url)
            .map_or(false, |ext| self.document_extensions.contains(&ext));
        if is_document || !is_page_candidate(&url) {
            tracing::trace!("Dropping non-page link {}", url);
            return false;
        }

        if !self.seen.insert(url.as_str().to_string()) {
            return false;
        }

        self.discovered_count += 1;
        self.queue.push_back(QueuedUrl { url, request_url });
        true
    }

    /// Pops the earliest-queued URL and marks it visited
    ///
    /// Returns `None` when the frontier is empty.
    pub fn dequeue_next(&mut self) -> Option<QueuedUrl> {
        let next = self.queue.pop_front()?;
        self.visited.insert(next.url.as_str().to_string());
        Some(next)
    }

    /// Returns true if no URLs are waiting
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of URLs waiting to be fetched
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Number of URLs accepted since the frontier was created
    pub fn discovered_count(&self) -> usize {
        self.discovered_count
    }

    /// Returns true if the URL has already been dequeued
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }
}
