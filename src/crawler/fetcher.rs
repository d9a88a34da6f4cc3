//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings and deadlines
//! - Rate-limited GET requests against the target origin
//! - Forwarding the job's auth token
//! - Error classification (fatal auth rejection vs per-URL failure)

use crate::config::{CrawlConfig, UserAgentConfig};
use crate::crawler::rate_limiter::RateLimiter;
use crate::PorterError;
use reqwest::{header, redirect::Policy, Client, StatusCode};
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

/// Raw content and response metadata for one fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL that was requested
    pub url: Url,

    /// Final URL after redirects
    pub final_url: Url,

    /// HTTP status code
    pub status_code: u16,

    /// Content-Type header value (empty when absent)
    pub content_type: String,

    /// Page body content
    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `fetch_timeout` - Per-request deadline in seconds
///
/// # Example
///
/// ```no_run
/// use site_porter::config::UserAgentConfig;
/// use site_porter::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "SitePorter".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, 30).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    fetch_timeout: u64,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(format_user_agent(user_agent))
        .timeout(Duration::from_secs(fetch_timeout))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Formats the user agent string: `Name/Version (+ContactURL; ContactEmail)`
pub fn format_user_agent(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// Issues rate-limited GET requests for a single crawl job
///
/// One fetcher belongs to one job and is driven sequentially, so at most
/// one request is in flight at a time.
pub struct Fetcher {
    client: Client,
    limiter: RateLimiter,
    auth_token: Option<String>,
}

impl Fetcher {
    /// Creates a fetcher for the given crawl configuration
    pub fn new(config: &CrawlConfig, user_agent: &UserAgentConfig) -> Result<Self, PorterError> {
        let client = build_http_client(user_agent, config.fetch_timeout)?;
        Ok(Self::with_client(client, config))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client, config: &CrawlConfig) -> Self {
        Self {
            client,
            limiter: RateLimiter::new(config.crawl_delay),
            auth_token: config.token().map(str::to_string),
        }
    }

    /// Time until the next fetch may start, if it cannot start now
    pub fn time_until_ready(&self) -> Option<Duration> {
        self.limiter.time_until_ready(Instant::now())
    }

    /// Number of requests issued so far
    pub fn fetch_count(&self) -> u64 {
        self.limiter.fetch_count()
    }

    /// Fetches a page, waiting for the rate limit first
    ///
    /// # Error Classification
    ///
    /// | Condition | Error |
    /// |-----------|-------|
    /// | HTTP 401/403 with a token | `Auth` (job-fatal) |
    /// | Any other non-2xx status | `HttpStatus` |
    /// | Content-Type present and not HTML | `ContentMismatch` |
    /// | Connection, timeout, body read failure | `Network` |
    pub async fn fetch(&mut self, url: &Url) -> Result<FetchedPage, PorterError> {
        self.limiter.wait().await;
        self.limiter.record_fetch(Instant::now());

        tracing::debug!("GET {}", url);

        let mut request = self.client.get(url.clone());
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|source| PorterError::Network {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        let final_url = response.url().clone();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            if self.auth_token.is_some() {
                return Err(PorterError::Auth {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }
            return Err(PorterError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if !status.is_success() {
            return Err(PorterError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !is_html_content_type(&content_type) {
            return Err(PorterError::ContentMismatch {
                url: url.to_string(),
                content_type,
            });
        }

        let body = response.text().await.map_err(|source| PorterError::Network {
            url: url.to_string(),
            source,
        })?;

        Ok(FetchedPage {
            url: url.clone(),
            final_url,
            status_code: status.as_u16(),
            content_type,
            body,
        })
    }
}

/// Returns true for HTML content types, or when the server sent none
fn is_html_content_type(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.is_empty()
        || content_type.contains("text/html")
        || content_type.contains("application/xhtml")
}
