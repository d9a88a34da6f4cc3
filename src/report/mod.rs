//! Migration report module
//!
//! This module handles:
//! - Synthesizing a migration report from a crawl corpus
//! - Exporting corpora and reports as JSON (and reading corpora back)
//! - Rendering a markdown summary for people

mod markdown;
mod synthesize;
mod types;

pub use markdown::{format_markdown_report, write_markdown_report};
pub use synthesize::{synthesize, synthesize_corpus, HIGH_VALUE_PAGE_LIMIT};
pub use types::{
    ContentAudit, HighValuePage, MediaOptimization, MigrationPriority, MigrationReport,
    PriorityBucket, ReportSummary, UrlMapping,
};

use crate::corpus::CrawlCorpus;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while exporting or importing crawl output
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Writes any serializable value (corpus, report) as pretty-printed JSON
pub fn write_json<T: Serialize>(value: &T, output_path: &Path) -> OutputResult<()> {
    let mut writer = BufWriter::new(File::create(output_path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Reads a corpus previously written with [`write_json`]
pub fn load_corpus(path: &Path) -> OutputResult<CrawlCorpus> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
