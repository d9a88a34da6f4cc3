//! Site-Porter main entry point
//!
//! This is the command-line interface for the Site-Porter migration crawler.

use anyhow::Context;
use clap::Parser;
use site_porter::config::{load_config_with_hash, Config};
use site_porter::crawler::{start, CrawlEvent};
use site_porter::report::{
    load_corpus, synthesize_corpus, write_json, write_markdown_report, MigrationReport,
};
use site_porter::CrawlCorpus;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Site-Porter: a website migration crawler
///
/// Site-Porter crawls a single website, classifies every page it can reach,
/// collects the images, videos and documents those pages use, and writes a
/// migration report with priorities and a redirect map.
#[derive(Parser, Debug)]
#[command(name = "site-porter")]
#[command(version = "1.0.0")]
#[command(about = "A website migration crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "report_from")]
    dry_run: bool,

    /// Rebuild the report from an exported corpus instead of crawling
    #[arg(long, value_name = "CORPUS", conflicts_with = "dry_run")]
    report_from: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
    } else if let Some(corpus_path) = &cli.report_from {
        handle_report_from(&config, corpus_path)?;
    } else {
        handle_crawl(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_porter=info,warn"),
            1 => EnvFilter::new("site_porter=debug,info"),
            2 => EnvFilter::new("site_porter=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    let crawl = &config.crawl;

    println!("=== Site-Porter Dry Run ===\n");

    println!("Crawl:");
    println!("  Target: {}", crawl.target_url);
    println!("  Max pages: {}", crawl.max_pages);
    println!("  Delay between fetches: {}ms", crawl.crawl_delay);
    println!("  Fetch timeout: {}s", crawl.fetch_timeout);
    println!(
        "  Auth token: {}",
        if crawl.token().is_some() { "set" } else { "none" }
    );
    println!("  Require auth: {}", crawl.require_auth);
    println!("  Download images: {}", crawl.download_images);
    println!("  Download documents: {}", crawl.download_documents);
    println!(
        "  Document extensions: {}",
        crawl.document_extensions.join(", ")
    );

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nOutput:");
    println!("  Corpus: {}", config.output.corpus_path);
    println!("  Report: {}", config.output.report_path);
    println!("  Summary: {}", config.output.summary_path);

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would crawl up to {} pages of {}",
        crawl.max_pages, crawl.target_url
    );
}

/// Handles the --report-from mode: recomputes the report from a saved corpus
fn handle_report_from(config: &Config, corpus_path: &Path) -> anyhow::Result<()> {
    tracing::info!("Loading corpus from {}", corpus_path.display());
    let corpus = load_corpus(corpus_path)
        .with_context(|| format!("Failed to read corpus {}", corpus_path.display()))?;

    let report = synthesize_corpus(&corpus);
    write_report(config, &report)?;

    println!(
        "✓ Report rebuilt from {} pages: {}",
        report.summary.total_pages, config.output.report_path
    );
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    let mut handle = start(config.clone()).context("Failed to start crawl")?;

    // Ctrl-C stops the job cooperatively so the partial corpus is still written
    let controller = handle.controller();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current page");
            if let Err(e) = controller.stop() {
                tracing::debug!("Stop ignored: {}", e);
            }
        }
    });

    while let Some(event) = handle.next_event().await {
        log_event(&event);
    }

    let status = handle.status();
    let corpus = handle.join().await.context("Crawl failed")?;
    tracing::info!("Crawl finished with status {}", status);

    write_outputs(&config, &corpus)?;
    Ok(())
}

fn log_event(event: &CrawlEvent) {
    match event {
        CrawlEvent::Progress(progress) => tracing::info!(
            "Progress: {} fetched, {} discovered, {} images, {} videos, {} documents",
            progress.fetched_count,
            progress.discovered_count,
            progress.images_found,
            progress.videos_found,
            progress.documents_found
        ),
        CrawlEvent::PageCrawled(page) => {
            tracing::info!("Crawled {} [{}] {}", page.url, page.page_type, page.title)
        }
        CrawlEvent::ImageFound(image) => tracing::debug!("Image: {}", image.url),
        CrawlEvent::VideoFound(video) => {
            tracing::debug!("Video ({}): {}", video.platform.as_str(), video.url)
        }
        CrawlEvent::DocumentFound(document) => tracing::debug!("Document: {}", document.url),
        CrawlEvent::Error { url, message } => tracing::warn!("{}: {}", url, message),
        CrawlEvent::Complete(corpus) => tracing::info!(
            "Crawl complete: {} pages, {} images, {} videos, {} documents",
            corpus.pages.len(),
            corpus.images.len(),
            corpus.videos.len(),
            corpus.documents.len()
        ),
        CrawlEvent::Failed { message } => tracing::error!("Crawl failed: {}", message),
    }
}

fn write_outputs(config: &Config, corpus: &CrawlCorpus) -> anyhow::Result<()> {
    let corpus_path = Path::new(&config.output.corpus_path);
    write_json(corpus, corpus_path)
        .with_context(|| format!("Failed to write corpus {}", corpus_path.display()))?;
    println!("✓ Corpus written to: {}", corpus_path.display());

    let report = synthesize_corpus(corpus);
    write_report(config, &report)
}

fn write_report(config: &Config, report: &MigrationReport) -> anyhow::Result<()> {
    let report_path = Path::new(&config.output.report_path);
    write_json(report, report_path)
        .with_context(|| format!("Failed to write report {}", report_path.display()))?;
    println!("✓ Report written to: {}", report_path.display());

    let summary_path = Path::new(&config.output.summary_path);
    write_markdown_report(report, summary_path)
        .with_context(|| format!("Failed to write summary {}", summary_path.display()))?;
    println!("✓ Summary written to: {}", summary_path.display());

    Ok(())
}
