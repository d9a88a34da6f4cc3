//! Crawl corpus: the pages and assets accumulated by a job
//!
//! The corpus keeps pages in discovery order and deduplicates pages and
//! assets by URL. The first record for a key wins; later duplicates are
//! dropped, so the page that first introduced an asset stays canonical.

mod types;

pub use types::{
    CrawledPage, DocumentAsset, DocumentType, ImageAsset, ImageContext, PageMedia, PageMetadata,
    PageType, VideoAsset, VideoPlatform,
};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Pages and assets collected by one crawl job
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlCorpus {
    /// Origin the job crawled
    pub target_url: String,

    /// Pages in discovery order
    pub pages: Vec<CrawledPage>,

    /// Unique images in first-seen order
    pub images: Vec<ImageAsset>,

    /// Unique videos in first-seen order
    pub videos: Vec<VideoAsset>,

    /// Unique documents in first-seen order
    pub documents: Vec<DocumentAsset>,

    #[serde(skip)]
    keys: CorpusKeys,
}

#[derive(Debug, Clone, Default)]
struct CorpusKeys {
    pages: HashSet<String>,
    images: HashSet<String>,
    videos: HashSet<String>,
    documents: HashSet<String>,
}

impl CrawlCorpus {
    /// Creates an empty corpus for the given origin
    pub fn new(target_url: impl Into<String>) -> Self {
        Self {
            target_url: target_url.into(),
            ..Self::default()
        }
    }

    /// Adds a page; returns false if a page with the same URL exists
    pub fn add_page(&mut self, page: CrawledPage) -> bool {
        self.ensure_keys();
        if !self.keys.pages.insert(page.url.clone()) {
            return false;
        }
        self.pages.push(page);
        true
    }

    /// Adds an image; returns false if its URL was already recorded
    pub fn add_image(&mut self, image: ImageAsset) -> bool {
        self.ensure_keys();
        if !self.keys.images.insert(image.url.clone()) {
            return false;
        }
        self.images.push(image);
        true
    }

    /// Adds a video; returns false if its URL was already recorded
    pub fn add_video(&mut self, video: VideoAsset) -> bool {
        self.ensure_keys();
        if !self.keys.videos.insert(video.url.clone()) {
            return false;
        }
        self.videos.push(video);
        true
    }

    /// Adds a document; returns false if its URL was already recorded
    pub fn add_document(&mut self, document: DocumentAsset) -> bool {
        self.ensure_keys();
        if !self.keys.documents.insert(document.url.clone()) {
            return false;
        }
        self.documents.push(document);
        true
    }

    /// Returns true if a page with this URL is present
    pub fn contains_page(&self, url: &str) -> bool {
        self.keys.pages.contains(url) || self.pages.iter().any(|p| p.url == url)
    }

    /// Total words across all pages
    pub fn total_word_count(&self) -> usize {
        self.pages.iter().map(|p| p.word_count).sum()
    }

    /// Rebuilds the key index after deserialization
    ///
    /// A deserialized corpus has records but no index. Rebuilding also drops
    /// any duplicate records the input carried.
    fn ensure_keys(&mut self) {
        let indexed = self.keys.pages.len()
            + self.keys.images.len()
            + self.keys.videos.len()
            + self.keys.documents.len();
        let stored = self.pages.len() + self.images.len() + self.videos.len() + self.documents.len();
        if indexed == stored {
            return;
        }

        let mut keys = CorpusKeys::default();
        self.pages.retain(|p| keys.pages.insert(p.url.clone()));
        self.images.retain(|i| keys.images.insert(i.url.clone()));
        self.videos.retain(|v| keys.videos.insert(v.url.clone()));
        self.documents.retain(|d| keys.documents.insert(d.url.clone()));
        self.keys = keys;
    }
}
