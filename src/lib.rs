//! Site-Porter: a website migration crawler
//!
//! This crate crawls a single public website, classifies every reachable page,
//! collects the images, videos and documents it embeds, and synthesizes a
//! migration report that says what to move first and where it should land.

pub mod config;
pub mod corpus;
pub mod crawler;
pub mod report;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Site-Porter operations
#[derive(Debug, Error)]
pub enum PorterError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Authorization rejected for {url} (HTTP {status})")]
    Auth { url: String, status: u16 },

    #[error("Network error for {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Expected HTML from {url}, got {content_type}")]
    ContentMismatch { url: String, content_type: String },

    #[error("HTML parse error for {url}: {message}")]
    Parse { url: String, message: String },

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition {
        from: state::JobStatus,
        to: state::JobStatus,
    },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Crawl task ended abnormally: {0}")]
    Task(String),
}

impl PorterError {
    /// Returns true if this error must abort the whole job
    ///
    /// Configuration and authorization failures are job-fatal. Everything else
    /// is scoped to the URL that produced it.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Auth { .. })
    }

    /// Returns the URL this error is attributed to, if any
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Auth { url, .. }
            | Self::Network { url, .. }
            | Self::HttpStatus { url, .. }
            | Self::ContentMismatch { url, .. }
            | Self::Parse { url, .. } => Some(url),
            _ => None,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("An auth token is required but none was configured")]
    MissingAuthToken,
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Site-Porter operations
pub type Result<T> = std::result::Result<T, PorterError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use corpus::{CrawlCorpus, CrawledPage, DocumentAsset, ImageAsset, PageType, VideoAsset};
pub use crawler::{start, CrawlEvent, CrawlHandle, CrawlProgress, JobController};
pub use report::{synthesize, MigrationReport};
pub use state::JobStatus;
