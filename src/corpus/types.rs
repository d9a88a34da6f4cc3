//! Record types produced by a crawl
//!
//! Every record here is handed to external collaborators (dashboard, asset
//! downloader, file writer), so all of them serialize to plain JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a page on the site being migrated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageType {
    Home,
    About,
    Services,
    Blog,
    Contact,
    CaseStudy,
    Resources,
    Legal,
    Other,
}

impl PageType {
    /// Returns the label used in reports and exports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::About => "about",
            Self::Services => "services",
            Self::Blog => "blog",
            Self::Contact => "contact",
            Self::CaseStudy => "case-study",
            Self::Resources => "resources",
            Self::Legal => "legal",
            Self::Other => "other",
        }
    }

    /// Returns every page type in declaration order
    pub fn all() -> [PageType; 9] {
        [
            Self::Home,
            Self::About,
            Self::Services,
            Self::Blog,
            Self::Contact,
            Self::CaseStudy,
            Self::Resources,
            Self::Legal,
            Self::Other,
        ]
    }
}

impl Default for PageType {
    fn default() -> Self {
        Self::Other
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata read from a page's head and headings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Meta description (falls back to `og:description`)
    pub description: Option<String>,

    /// Meta keywords
    pub keywords: Option<String>,

    /// Open Graph title
    pub og_title: Option<String>,

    /// Open Graph image, resolved to an absolute URL
    pub og_image: Option<String>,

    /// Canonical link, resolved to an absolute URL
    pub canonical: Option<String>,

    /// `lang` attribute of the root element
    pub language: Option<String>,

    /// Text of every `<h1>`
    pub headings: Vec<String>,

    /// Leading slice of the visible text
    pub excerpt: String,
}

impl PageMetadata {
    /// Returns true if the page has a non-blank description
    pub fn has_description(&self) -> bool {
        self.description
            .as_deref()
            .map_or(false, |d| !d.trim().is_empty())
    }
}

/// Media referenced by a single page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMedia {
    /// Image source URLs in document order
    pub images: Vec<String>,

    /// Video embed URLs in document order
    pub videos: Vec<String>,

    /// Document URLs in document order
    pub documents: Vec<String>,
}

/// The classified record produced for one fetched URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawledPage {
    /// Normalized page URL, unique within a job
    pub url: String,

    /// URL-safe identifier derived from the path; empty for the home page
    pub slug: String,

    /// Page title (empty when none could be found)
    pub title: String,

    /// Classified role of the page
    pub page_type: PageType,

    /// Whitespace-delimited tokens of visible text
    pub word_count: usize,

    /// Head metadata
    pub metadata: PageMetadata,

    /// Media referenced by this page
    pub media: PageMedia,

    /// When the page was fetched
    pub crawled_at: DateTime<Utc>,
}

/// Where an image sits on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageContext {
    Logo,
    Hero,
    Gallery,
    Content,
}

impl ImageContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Logo => "logo",
            Self::Hero => "hero",
            Self::Gallery => "gallery",
            Self::Content => "content",
        }
    }
}

/// An image referenced by the site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAsset {
    /// Absolute source URL (identity key)
    pub url: String,

    /// Alt text; empty when missing
    pub alt: String,

    /// Title attribute
    pub title: Option<String>,

    /// Structural context
    pub context: ImageContext,

    /// Declared width in pixels
    pub width: Option<u32>,

    /// Declared height in pixels
    pub height: Option<u32>,

    /// Format inferred from the file extension
    pub format: Option<String>,

    /// Size in bytes, filled in by the downloader
    pub file_size: Option<u64>,

    /// Page that first referenced this image
    pub page_url: String,

    /// Set by the external downloader, never by the crawler
    pub downloaded: bool,
}

impl ImageAsset {
    /// Returns true if the image has no usable alt text
    pub fn needs_alt_text(&self) -> bool {
        self.alt.trim().is_empty()
    }
}

/// Known video hosting platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VideoPlatform {
    Youtube,
    Vimeo,
    Wistia,
    Loom,
    Dailymotion,
    Vidyard,
    SelfHosted,
    Other,
}

impl VideoPlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Youtube => "youtube",
            Self::Vimeo => "vimeo",
            Self::Wistia => "wistia",
            Self::Loom => "loom",
            Self::Dailymotion => "dailymotion",
            Self::Vidyard => "vidyard",
            Self::SelfHosted => "self-hosted",
            Self::Other => "other",
        }
    }
}

/// A video embedded in the site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoAsset {
    /// Absolute embed or source URL (identity key)
    pub url: String,

    /// Hosting platform
    pub platform: VideoPlatform,

    /// Platform-specific video ID, when recognizable
    pub video_id: Option<String>,

    /// Title attribute of the embed
    pub title: Option<String>,

    /// Poster image for self-hosted video
    pub thumbnail: Option<String>,

    /// Page that first embedded this video
    pub page_url: String,

    /// Set by the external downloader, never by the crawler
    pub downloaded: bool,
}

/// Broad family of a linked document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentType {
    Pdf,
    Word,
    Spreadsheet,
    Presentation,
    Text,
    Other,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Word => "word",
            Self::Spreadsheet => "spreadsheet",
            Self::Presentation => "presentation",
            Self::Text => "text",
            Self::Other => "other",
        }
    }
}

/// A downloadable document linked from the site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentAsset {
    /// Absolute document URL (identity key)
    pub url: String,

    /// Document family
    pub file_type: DocumentType,

    /// Lowercase file extension
    pub extension: String,

    /// Anchor text of the first link to it
    pub title: String,

    /// Size in bytes, filled in by the downloader
    pub file_size: Option<u64>,

    /// Page that first linked this document
    pub page_url: String,

    /// Set by the external downloader, never by the crawler
    pub downloaded: bool,
}
