//! Events delivered to observers of a running crawl job
//!
//! Events arrive in the order the crawl loop produced them. For every
//! successfully fetched page the order is: `PageCrawled`, one event per newly
//! discovered asset, then `Progress`.

use crate::corpus::{CrawlCorpus, CrawledPage, DocumentAsset, ImageAsset, VideoAsset};
use serde::{Deserialize, Serialize};

/// Counters snapshot sent after every processed URL
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlProgress {
    /// Fetch attempts made, successful or not (never exceeds `max_pages`)
    pub fetched_count: usize,

    /// Same-origin page URLs accepted into the frontier, seed included
    pub discovered_count: usize,

    /// Unique images in the corpus
    pub images_found: usize,

    /// Unique videos in the corpus
    pub videos_found: usize,

    /// Unique documents in the corpus
    pub documents_found: usize,

    /// Pages in the corpus
    pub pages_crawled: usize,

    /// Per-URL errors reported so far
    pub errors: usize,
}

/// A single message from the crawl loop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum CrawlEvent {
    /// Counters after a URL was processed
    Progress(CrawlProgress),

    /// A page was fetched and classified
    PageCrawled(CrawledPage),

    /// An image not seen before in this job
    ImageFound(ImageAsset),

    /// A video not seen before in this job
    VideoFound(VideoAsset),

    /// A document not seen before in this job
    DocumentFound(DocumentAsset),

    /// A single URL failed; the crawl continues
    Error { url: String, message: String },

    /// The job finished (completed or stopped) with this corpus
    Complete(CrawlCorpus),

    /// The job aborted on a fatal error; no corpus follows
    Failed { message: String },
}

impl CrawlEvent {
    /// Returns true for the last event a job emits
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Complete(_) | Self::Failed { .. })
    }

    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Progress(_) => "progress",
            Self::PageCrawled(_) => "page_crawled",
            Self::ImageFound(_) => "image_found",
            Self::VideoFound(_) => "video_found",
            Self::DocumentFound(_) => "document_found",
            Self::Error { .. } => "error",
            Self::Complete(_) => "complete",
            Self::Failed { .. } => "failed",
        }
    }
}
