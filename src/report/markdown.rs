//! Markdown migration summary
//!
//! This module renders a migration report as a human-readable markdown
//! document: overview, page types, priority buckets, audit findings, media
//! findings, recommendations and the redirect table.

use crate::report::types::{MigrationReport, PriorityBucket};
use crate::report::OutputResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Longest list printed in full before it is truncated
const LIST_LIMIT: usize = 50;

/// Writes the markdown summary of a report to a file
///
/// # Arguments
///
/// * `report` - The migration report
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn write_markdown_report(report: &MigrationReport, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_report(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a migration report as markdown
pub fn format_markdown_report(report: &MigrationReport) -> String {
    let mut md = String::new();
    let summary = &report.summary;

    md.push_str("# Site Migration Report\n\n");
    md.push_str(&format!("Source site: {}\n\n", report.target_url));

    // Overview
    md.push_str("## Overview\n\n");
    md.push_str(&format!("- **Pages**: {}\n", summary.total_pages));
    md.push_str(&format!("- **Images**: {}\n", summary.total_images));
    md.push_str(&format!("- **Videos**: {}\n", summary.total_videos));
    md.push_str(&format!("- **Documents**: {}\n", summary.total_documents));
    md.push_str(&format!(
        "- **Total Words**: {}\n\n",
        summary.total_word_count
    ));

    // Page types
    md.push_str("## Pages by Type\n\n");
    md.push_str("| Type | Pages |\n");
    md.push_str("|------|-------|\n");
    for (page_type, count) in summary.pages_by_type.iter().filter(|(_, c)| **c > 0) {
        md.push_str(&format!("| {} | {} |\n", page_type, count));
    }
    md.push('\n');

    // Priority buckets
    md.push_str("## Migration Priority\n\n");
    for (bucket, urls) in report.migration_priority.buckets() {
        md.push_str(&format!("### {} ({})\n\n", bucket_title(bucket), urls.len()));
        push_url_list(&mut md, urls);
    }

    // Content audit
    let audit = &report.content_audit;
    md.push_str("## Content Audit\n\n");
    if !audit.high_value_pages.is_empty() {
        md.push_str("### High-Value Pages\n\n");
        md.push_str("| Page | Type | Words |\n");
        md.push_str("|------|------|-------|\n");
        for page in &audit.high_value_pages {
            let label = if page.title.is_empty() {
                page.url.as_str()
            } else {
                page.title.as_str()
            };
            md.push_str(&format!(
                "| [{}]({}) | {} | {} |\n",
                escape_cell(label),
                page.url,
                page.page_type,
                page.word_count
            ));
        }
        md.push('\n');
    }
    md.push_str(&format!(
        "### Missing Meta Descriptions ({})\n\n",
        audit.missing_metadata.len()
    ));
    push_url_list(&mut md, &audit.missing_metadata);

    // Media
    let media = &report.media_optimization;
    md.push_str("## Media\n\n");
    md.push_str(&format!(
        "### Images Missing Alt Text ({})\n\n",
        media.images_needing_alt_text.len()
    ));
    push_url_list(&mut md, &media.images_needing_alt_text);

    // Recommendations
    md.push_str("## Recommendations\n\n");
    for (i, recommendation) in report.recommendations.iter().enumerate() {
        md.push_str(&format!("{}. {}\n", i + 1, recommendation));
    }
    md.push('\n');

    // Redirects
    if !report.url_mapping.is_empty() {
        md.push_str("## URL Mapping\n\n");
        md.push_str("| Old URL | New URL | Redirect | Notes |\n");
        md.push_str("|---------|---------|----------|-------|\n");
        for mapping in &report.url_mapping {
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                mapping.old_url,
                mapping.new_url,
                mapping.redirect_type,
                escape_cell(&mapping.notes)
            ));
        }
        md.push('\n');
    }

    md.push_str("---\n\n");
    md.push_str("*Generated by Site-Porter*\n");

    md
}

fn bucket_title(bucket: PriorityBucket) -> &'static str {
    match bucket {
        PriorityBucket::Priority1 => "Priority 1",
        PriorityBucket::Priority2 => "Priority 2",
        PriorityBucket::Priority3 => "Priority 3",
        PriorityBucket::Archive => "Archive",
    }
}

fn push_url_list(md: &mut String, urls: &[String]) {
    if urls.is_empty() {
        md.push_str("None.\n\n");
        return;
    }
    for url in urls.iter().take(LIST_LIMIT) {
        md.push_str(&format!("- {}\n", url));
    }
    if urls.len() > LIST_LIMIT {
        md.push_str(&format!("\n... and {} more\n", urls.len() - LIST_LIMIT));
    }
    md.push('\n');
}

/// Keeps table cells on one row
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{CrawlCorpus, CrawledPage, PageType};
    use crate::report::synthesize_corpus;
    use tempfile::tempdir;

    fn sample_report() -> MigrationReport {
        let mut corpus = CrawlCorpus::new("https://example.com/");
        corpus.add_page(CrawledPage {
            url: "https://example.com/".to_string(),
            slug: String::new(),
            title: "Home | Acme".to_string(),
            page_type: PageType::Home,
            word_count: 250,
            metadata: Default::default(),
            media: Default::default(),
            crawled_at: chrono::Utc::now(),
        });
        synthesize_corpus(&corpus)
    }

    #[test]
    fn test_format_markdown_report() {
        let markdown = format_markdown_report(&sample_report());

        assert!(markdown.contains("# Site Migration Report"));
        assert!(markdown.contains("Source site: https://example.com/"));
        assert!(markdown.contains("- **Pages**: 1"));
        assert!(markdown.contains("| home | 1 |"));
        assert!(!markdown.contains("| blog | 0 |"));
        assert!(markdown.contains("### Priority 1 (1)"));
        assert!(markdown.contains("### Archive (0)"));
        assert!(markdown.contains("| [Home \\| Acme](https://example.com/) | home | 250 |"));
        assert!(markdown.contains("### Missing Meta Descriptions (1)"));
        assert!(markdown.contains("| https://example.com/ | / | 301 |"));
    }

    #[test]
    fn test_long_lists_truncated() {
        let urls: Vec<String> = (0..60).map(|i| format!("https://example.com/{}", i)).collect();
        let mut md = String::new();
        push_url_list(&mut md, &urls);
        assert!(md.contains("https://example.com/49"));
        assert!(!md.contains("https://example.com/50\n"));
        assert!(md.contains("... and 10 more"));
    }

    #[test]
    fn test_write_markdown_report() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.md");
        write_markdown_report(&sample_report(), &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# Site Migration Report"));
    }
}
