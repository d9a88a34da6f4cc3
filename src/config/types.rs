use serde::{Deserialize, Serialize};

/// Main configuration structure for Site-Porter
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub crawl: CrawlConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawl job configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CrawlConfig {
    /// Origin of the site to migrate; crawling never leaves it
    #[serde(rename = "target-url")]
    pub target_url: String,

    /// Maximum number of page fetches for the job
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Minimum time between the starts of two fetches (milliseconds)
    #[serde(rename = "crawl-delay", default)]
    pub crawl_delay: u64,

    /// Advisory flag for the external image download step
    #[serde(rename = "download-images", default)]
    pub download_images: bool,

    /// Advisory flag for the external document download step
    #[serde(rename = "download-documents", default)]
    pub download_documents: bool,

    /// Bearer token sent with every fetch
    #[serde(rename = "auth-token", default)]
    pub auth_token: Option<String>,

    /// Refuse to start without an auth token
    #[serde(rename = "require-auth", default)]
    pub require_auth: bool,

    /// Per-fetch deadline (seconds)
    #[serde(rename = "fetch-timeout", default = "default_fetch_timeout")]
    pub fetch_timeout: u64,

    /// Link extensions recorded as documents instead of pages
    #[serde(
        rename = "document-extensions",
        default = "default_document_extensions"
    )]
    pub document_extensions: Vec<String>,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Path of the JSON export of crawled pages and assets
    #[serde(rename = "corpus-path", default = "default_corpus_path")]
    pub corpus_path: String,

    /// Path of the JSON migration report
    #[serde(rename = "report-path", default = "default_report_path")]
    pub report_path: String,

    /// Path of the markdown migration summary
    #[serde(rename = "summary-path", default = "default_summary_path")]
    pub summary_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            corpus_path: default_corpus_path(),
            report_path: default_report_path(),
            summary_path: default_summary_path(),
        }
    }
}

impl CrawlConfig {
    /// Creates a crawl configuration with defaults for everything but the
    /// target and the page budget
    pub fn new(target_url: impl Into<String>, max_pages: u32) -> Self {
        Self {
            target_url: target_url.into(),
            max_pages,
            crawl_delay: 0,
            download_images: false,
            download_documents: false,
            auth_token: None,
            require_auth: false,
            fetch_timeout: default_fetch_timeout(),
            document_extensions: default_document_extensions(),
        }
    }

    /// Returns the auth token if one is configured and non-blank
    pub fn token(&self) -> Option<&str> {
        self.auth_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

fn default_fetch_timeout() -> u64 {
    30
}

/// Default set of document extensions
pub fn default_document_extensions() -> Vec<String> {
    [
        "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "csv", "rtf", "odt", "ods", "odp",
        "txt",
    ]
    .iter()
    .map(|ext| ext.to_string())
    .collect()
}

fn default_corpus_path() -> String {
    "./corpus.json".to_string()
}

fn default_report_path() -> String {
    "./migration-report.json".to_string()
}

fn default_summary_path() -> String {
    "./migration-report.md".to_string()
}
