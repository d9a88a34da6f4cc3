//! Report synthesis
//!
//! A pure transform from a corpus to a [`MigrationReport`]. No I/O, inputs are
//! never modified, and the same input always yields the same report.

use crate::corpus::{CrawlCorpus, CrawledPage, DocumentAsset, ImageAsset, PageType, VideoAsset};
use crate::report::types::{
    ContentAudit, HighValuePage, MediaOptimization, MigrationPriority, MigrationReport,
    PriorityBucket, ReportSummary, UrlMapping,
};
use std::collections::BTreeMap;

/// Number of pages listed as high value
pub const HIGH_VALUE_PAGE_LIMIT: usize = 10;

/// Redirect status used for every mapping
const REDIRECT_TYPE: &str = "301";

/// Builds the migration report for a set of pages and assets
///
/// # Arguments
///
/// * `pages` - Crawled pages in discovery order
/// * `images`, `videos`, `documents` - Unique assets
/// * `target_url` - Origin the pages came from
///
/// An empty input produces a report with zero counts and empty lists.
pub fn synthesize(
    pages: &[CrawledPage],
    images: &[ImageAsset],
    videos: &[VideoAsset],
    documents: &[DocumentAsset],
    target_url: &str,
) -> MigrationReport {
    let summary = summarize(pages, images, videos, documents);
    let content_audit = audit_content(pages);
    let migration_priority = prioritize(pages);
    let url_mapping = pages.iter().map(map_url).collect();
    let media_optimization = MediaOptimization {
        images_needing_alt_text: images
            .iter()
            .filter(|image| image.needs_alt_text())
            .map(|image| image.url.clone())
            .collect(),
        images_needing_compression: Vec::new(),
        broken_media_links: Vec::new(),
    };

    let recommendations = recommend(
        &summary,
        &content_audit,
        &migration_priority,
        &media_optimization,
    );

    MigrationReport {
        target_url: target_url.to_string(),
        summary,
        content_audit,
        migration_priority,
        url_mapping,
        media_optimization,
        recommendations,
    }
}

/// Builds the migration report for a whole corpus
pub fn synthesize_corpus(corpus: &CrawlCorpus) -> MigrationReport {
    synthesize(
        &corpus.pages,
        &corpus.images,
        &corpus.videos,
        &corpus.documents,
        &corpus.target_url,
    )
}

fn summarize(
    pages: &[CrawledPage],
    images: &[ImageAsset],
    videos: &[VideoAsset],
    documents: &[DocumentAsset],
) -> ReportSummary {
    let mut pages_by_type: BTreeMap<PageType, usize> =
        PageType::all().into_iter().map(|t| (t, 0)).collect();
    for page in pages {
        *pages_by_type.entry(page.page_type).or_insert(0) += 1;
    }

    ReportSummary {
        total_pages: pages.len(),
        pages_by_type,
        total_images: images.len(),
        total_videos: videos.len(),
        total_documents: documents.len(),
        total_word_count: pages.iter().map(|p| p.word_count).sum(),
    }
}

fn audit_content(pages: &[CrawledPage]) -> ContentAudit {
    // Stable sort keeps discovery order among equal word counts
    let mut by_words: Vec<&CrawledPage> = pages.iter().collect();
    by_words.sort_by(|a, b| b.word_count.cmp(&a.word_count));

    ContentAudit {
        high_value_pages: by_words
            .into_iter()
            .take(HIGH_VALUE_PAGE_LIMIT)
            .map(|page| HighValuePage {
                url: page.url.clone(),
                title: page.title.clone(),
                page_type: page.page_type,
                word_count: page.word_count,
            })
            .collect(),
        missing_metadata: pages
            .iter()
            .filter(|page| !page.metadata.has_description())
            .map(|page| page.url.clone())
            .collect(),
        outdated_content: Vec::new(),
        duplicate_content: Vec::new(),
    }
}

fn prioritize(pages: &[CrawledPage]) -> MigrationPriority {
    let mut priority = MigrationPriority::default();
    for page in pages {
        priority
            .bucket_mut(PriorityBucket::for_page_type(page.page_type))
            .push(page.url.clone());
    }
    priority
}

fn map_url(page: &CrawledPage) -> UrlMapping {
    let notes = if page.title.is_empty() {
        format!("{} page (untitled)", page.page_type)
    } else {
        format!("{} page: {}", page.page_type, page.title)
    };

    UrlMapping {
        old_url: page.url.clone(),
        new_url: format!("/{}", page.slug),
        redirect_type: REDIRECT_TYPE.to_string(),
        notes,
    }
}

fn recommend(
    summary: &ReportSummary,
    audit: &ContentAudit,
    priority: &MigrationPriority,
    media: &MediaOptimization,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if summary.total_pages == 0 {
        recommendations.push(
            "No pages were crawled; check the target URL and access settings before migrating"
                .to_string(),
        );
    }

    if !audit.missing_metadata.is_empty() {
        recommendations.push(format!(
            "Add meta descriptions to {} missing them",
            plural(audit.missing_metadata.len(), "page")
        ));
    }

    if !media.images_needing_alt_text.is_empty() {
        recommendations.push(format!(
            "Write alt text for {} before migration",
            plural(media.images_needing_alt_text.len(), "image")
        ));
    }

    if !priority.priority1.is_empty() {
        recommendations.push(format!(
            "Migrate the {} in priority 1 (home, contact, services) first",
            plural(priority.priority1.len(), "page")
        ));
    }

    if !priority.archive.is_empty() {
        recommendations.push(format!(
            "Review {} in the archive bucket to decide whether to keep, merge or retire them",
            plural(priority.archive.len(), "page")
        ));
    }

    if summary.total_videos > 0 {
        recommendations.push(format!(
            "Re-embed {} on the new platform",
            plural(summary.total_videos, "video")
        ));
    }

    if summary.total_documents > 0 {
        recommendations.push(format!(
            "Check {} for outdated content before re-hosting",
            plural(summary.total_documents, "document")
        ));
    }

    recommendations.push(
        "Set up 301 redirects for every mapped URL and verify them after launch".to_string(),
    );
    recommendations
        .push("Test every migrated page on the new platform before retiring the old site".to_string());

    recommendations
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", count, noun)
    }
}
