//! Migration report types

use crate::corpus::PageType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Audit, prioritization and remapping derived from a crawl corpus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationReport {
    /// Origin that was crawled
    pub target_url: String,

    pub summary: ReportSummary,

    pub content_audit: ContentAudit,

    pub migration_priority: MigrationPriority,

    /// One redirect entry per page, in page order
    pub url_mapping: Vec<UrlMapping>,

    pub media_optimization: MediaOptimization,

    /// Human-readable next steps
    pub recommendations: Vec<String>,
}

/// Corpus totals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_pages: usize,

    /// Page count for every page type (zero counts included)
    pub pages_by_type: BTreeMap<PageType, usize>,

    pub total_images: usize,
    pub total_videos: usize,
    pub total_documents: usize,
    pub total_word_count: usize,
}

/// A page worth migrating with care
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighValuePage {
    pub url: String,
    pub title: String,
    pub page_type: PageType,
    pub word_count: usize,
}

/// Content findings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentAudit {
    /// Largest pages by word count, longest first
    pub high_value_pages: Vec<HighValuePage>,

    /// URLs of pages without a meta description
    pub missing_metadata: Vec<String>,

    /// Reserved; always empty
    pub outdated_content: Vec<String>,

    /// Reserved; always empty
    pub duplicate_content: Vec<String>,
}

/// Migration urgency of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityBucket {
    Priority1,
    Priority2,
    Priority3,
    Archive,
}

impl PriorityBucket {
    /// Bucket a page type belongs to
    pub fn for_page_type(page_type: PageType) -> Self {
        PRIORITY_RULES
            .iter()
            .find(|(_, types)| types.contains(&page_type))
            .map(|(bucket, _)| *bucket)
            .unwrap_or(Self::Archive)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Priority1 => "priority1",
            Self::Priority2 => "priority2",
            Self::Priority3 => "priority3",
            Self::Archive => "archive",
        }
    }
}

impl fmt::Display for PriorityBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Page types per bucket; anything unlisted is archived
const PRIORITY_RULES: &[(PriorityBucket, &[PageType])] = &[
    (
        PriorityBucket::Priority1,
        &[PageType::Home, PageType::Contact, PageType::Services],
    ),
    (
        PriorityBucket::Priority2,
        &[PageType::About, PageType::CaseStudy],
    ),
    (
        PriorityBucket::Priority3,
        &[PageType::Blog, PageType::Resources],
    ),
];

/// Page URLs grouped by migration urgency
///
/// Every page appears in exactly one bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MigrationPriority {
    pub priority1: Vec<String>,
    pub priority2: Vec<String>,
    pub priority3: Vec<String>,
    pub archive: Vec<String>,
}

impl MigrationPriority {
    /// Mutable access to a bucket's URL list
    pub fn bucket_mut(&mut self, bucket: PriorityBucket) -> &mut Vec<String> {
        match bucket {
            PriorityBucket::Priority1 => &mut self.priority1,
            PriorityBucket::Priority2 => &mut self.priority2,
            PriorityBucket::Priority3 => &mut self.priority3,
            PriorityBucket::Archive => &mut self.archive,
        }
    }

    /// Buckets in priority order with their URLs
    pub fn buckets(&self) -> [(PriorityBucket, &[String]); 4] {
        [
            (PriorityBucket::Priority1, self.priority1.as_slice()),
            (PriorityBucket::Priority2, self.priority2.as_slice()),
            (PriorityBucket::Priority3, self.priority3.as_slice()),
            (PriorityBucket::Archive, self.archive.as_slice()),
        ]
    }

    /// Total number of URLs across all buckets
    pub fn len(&self) -> usize {
        self.buckets().iter().map(|(_, urls)| urls.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Redirect from an old URL to its place on the new site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlMapping {
    pub old_url: String,

    /// `/` followed by the page slug
    pub new_url: String,

    /// HTTP redirect status, always `301`
    pub redirect_type: String,

    pub notes: String,
}

/// Media findings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaOptimization {
    /// URLs of images with empty alt text
    pub images_needing_alt_text: Vec<String>,

    /// Reserved; always empty
    pub images_needing_compression: Vec<String>,

    /// Reserved; always empty
    pub broken_media_links: Vec<String>,
}
