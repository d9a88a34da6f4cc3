//! Crawler module for website migration crawls
//!
//! This module contains the core crawling logic, including:
//! - The same-origin frontier and rate-limited fetching
//! - HTML parsing, page classification and asset extraction
//! - The job state machine and its event stream

mod assets;
mod classifier;
mod coordinator;
mod events;
mod fetcher;
mod frontier;
mod parser;
mod rate_limiter;

pub use assets::{detect_platform, document_type, extract_assets, video_id, ExtractedAssets};
pub use classifier::{
    classify_page, classify_with, ClassificationRule, RuleMatcher, PAGE_TYPE_RULES,
};
pub use coordinator::{start, CrawlHandle, JobController};
pub use events::{CrawlEvent, CrawlProgress};
pub use fetcher::{build_http_client, format_user_agent, FetchedPage, Fetcher};
pub use frontier::{Frontier, QueuedUrl};
pub use parser::{degraded_page, parse_page, ParsedPage};
pub use rate_limiter::RateLimiter;

use crate::config::Config;
use crate::corpus::CrawlCorpus;
use crate::PorterError;

/// Runs a complete crawl and returns its corpus
///
/// Convenience wrapper around [`start`] for callers that do not need the
/// event stream or the controls.
///
/// # Returns
///
/// * `Ok(CrawlCorpus)` - The job completed or was stopped
/// * `Err(PorterError)` - The configuration was invalid or a fatal error aborted the job
pub async fn crawl(config: Config) -> Result<CrawlCorpus, PorterError> {
    start(config)?.join().await
}
