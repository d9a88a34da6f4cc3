//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small five-page site and drive full
//! crawl jobs against it end-to-end.

use site_porter::config::{Config, CrawlConfig, OutputConfig, UserAgentConfig};
use site_porter::crawler::{start, CrawlEvent, CrawlHandle};
use site_porter::report::synthesize_corpus;
use site_porter::{JobStatus, PageType, PorterError};
use std::time::{Duration, Instant};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration for the given target
fn create_test_config(target: &str, max_pages: u32, crawl_delay: u64) -> Config {
    let mut crawl = CrawlConfig::new(target, max_pages);
    crawl.crawl_delay = crawl_delay;
    crawl.fetch_timeout = 5;

    Config {
        crawl,
        user_agent: UserAgentConfig {
            crawler_name: "TestPorter".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig::default(),
    }
}

fn html_page(title: &str, description: Option<&str>, body: &str) -> String {
    let meta = description
        .map(|d| format!(r#"<meta name="description" content="{}">"#, d))
        .unwrap_or_default();
    format!(
        r#"<html lang="en"><head><title>{}</title>{}</head><body>{}</body></html>"#,
        title, meta, body
    )
}

const NAV: &str = r#"<nav><a href="/">Home</a> <a href="/about">About</a> <a href="/contact">Contact</a></nav>"#;

/// Mounts the five-page fixture site
///
/// `/` links to `/about`, `/services`, `/blog` and `/contact`. The home page
/// has a logo with alt text, a YouTube embed and a PDF link; `/about` has an
/// image with an empty alt attribute. A path listed in `failing` answers 500.
async fn mount_site(server: &MockServer, failing: Option<&str>) {
    let pages = vec![
        (
            "/",
            html_page(
                "Acme Home",
                Some("Acme builds bridges"),
                r#"<header><img src="/img/logo.png" alt="Company Logo"></header>
                   <p>Welcome to Acme, builders of bridges since 1920.</p>
                   <iframe src="https://www.youtube.com/embed/abc123" title="Intro"></iframe>
                   <a href="/about">About</a>
                   <a href="/services">Services</a>
                   <a href="/blog">Blog</a>
                   <a href="/contact">Contact</a>
                   <a href="/files/brochure.pdf">Brochure</a>
                   <a href="https://elsewhere.example.org/">Partner</a>"#,
            ),
        ),
        (
            "/about",
            html_page(
                "About Acme",
                None,
                &format!(
                    r#"{}<h1>About us</h1><img src="/img/team.jpg" alt="">
                       <p>We are a team of engineers and designers.</p>"#,
                    NAV
                ),
            ),
        ),
        (
            "/services",
            html_page(
                "Our Services",
                Some("Bridge design and inspection"),
                &format!(r#"{}<p>Design. Inspection. Repair.</p>"#, NAV),
            ),
        ),
        (
            "/blog",
            html_page(
                "News and Blog",
                Some("Latest updates"),
                &format!(
                    r#"{}<img src="/img/logo.png" alt="Company Logo"><p>Our first post.</p>"#,
                    NAV
                ),
            ),
        ),
        (
            "/contact",
            html_page(
                "Contact",
                Some("Get in touch"),
                &format!(r#"{}<p>Call us any time.</p>"#, NAV),
            ),
        ),
    ];

    for (page_path, body) in pages {
        let response = if failing == Some(page_path) {
            ResponseTemplate::new(500)
        } else {
            ResponseTemplate::new(200).set_body_raw(body, "text/html")
        };
        Mock::given(method("GET"))
            .and(path(page_path))
            .respond_with(response)
            .mount(server)
            .await;
    }
}

fn page_urls(events: &[CrawlEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            CrawlEvent::PageCrawled(page) => Some(page.url.clone()),
            _ => None,
        })
        .collect()
}

fn last_progress(events: &[CrawlEvent]) -> site_porter::CrawlProgress {
    events
        .iter()
        .rev()
        .find_map(|event| match event {
            CrawlEvent::Progress(progress) => Some(*progress),
            _ => None,
        })
        .expect("no progress event")
}

/// Reads events until `count` pages have been crawled
async fn wait_for_pages(handle: &mut CrawlHandle, count: usize) -> Vec<CrawlEvent> {
    let mut events = Vec::new();
    while page_urls(&events).len() < count {
        let event = handle.next_event().await.expect("event stream ended early");
        events.push(event);
    }
    events
}

fn drain(handle: &mut CrawlHandle, events: &mut Vec<CrawlEvent>) {
    while let Some(event) = handle.try_next_event() {
        events.push(event);
    }
}

#[tokio::test]
async fn test_full_crawl_completes() {
    let server = MockServer::start().await;
    mount_site(&server, None).await;
    let base = server.uri();

    let handle = start(create_test_config(&base, 10, 0)).expect("job should start");
    let status = handle.controller();
    let (events, result) = handle.collect().await;
    let corpus = result.expect("crawl should succeed");

    assert_eq!(status.status(), JobStatus::Completed);
    assert_eq!(corpus.pages.len(), 5);
    assert_eq!(last_progress(&events).fetched_count, 5);
    assert_eq!(last_progress(&events).pages_crawled, 5);
    assert_eq!(last_progress(&events).errors, 0);

    // Pages arrive in breadth-first discovery order
    assert_eq!(
        page_urls(&events),
        vec![
            format!("{}/", base),
            format!("{}/about", base),
            format!("{}/services", base),
            format!("{}/blog", base),
            format!("{}/contact", base),
        ]
    );

    let types: Vec<_> = corpus.pages.iter().map(|p| p.page_type).collect();
    assert_eq!(
        types,
        vec![
            PageType::Home,
            PageType::About,
            PageType::Services,
            PageType::Blog,
            PageType::Contact
        ]
    );

    // Logo is shared by two pages but recorded once, against the first page
    assert_eq!(corpus.images.len(), 2);
    assert_eq!(corpus.images[0].page_url, format!("{}/", base));
    assert_eq!(corpus.videos.len(), 1);
    assert_eq!(corpus.videos[0].video_id.as_deref(), Some("abc123"));
    assert_eq!(corpus.documents.len(), 1);
    assert!(corpus.documents[0].url.ends_with("/files/brochure.pdf"));

    let report = synthesize_corpus(&corpus);
    assert_eq!(report.summary.total_pages, 5);
    assert_eq!(report.url_mapping.len(), 5);

    // The stream ends with exactly one completion event
    assert!(matches!(events.last(), Some(CrawlEvent::Complete(c)) if c.pages.len() == 5));
    assert_eq!(events.iter().filter(|e| e.is_final()).count(), 1);
}

#[tokio::test]
async fn test_home_page_event_order() {
    let server = MockServer::start().await;
    mount_site(&server, None).await;

    let handle = start(create_test_config(&server.uri(), 1, 0)).unwrap();
    let (events, _) = handle.collect().await;

    let kinds: Vec<_> = events.iter().map(|e| e.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            "page_crawled",
            "image_found",
            "video_found",
            "document_found",
            "progress",
            "complete"
        ]
    );
}

#[tokio::test]
async fn test_page_budget_caps_fetches() {
    let server = MockServer::start().await;
    mount_site(&server, None).await;

    let handle = start(create_test_config(&server.uri(), 2, 0)).unwrap();
    let status = handle.controller();
    let (events, result) = handle.collect().await;
    let corpus = result.unwrap();

    let progress = last_progress(&events);
    assert_eq!(progress.fetched_count, 2);
    assert_eq!(corpus.pages.len(), 2);
    assert!(progress.discovered_count > 2);
    assert_eq!(status.status(), JobStatus::Completed);
}

#[tokio::test]
async fn test_pause_and_resume() {
    let server = MockServer::start().await;
    mount_site(&server, None).await;
    let base = server.uri();

    let mut handle = start(create_test_config(&base, 10, 100)).unwrap();
    let mut events = wait_for_pages(&mut handle, 2).await;

    handle.pause().expect("running job can be paused");
    assert_eq!(handle.status(), JobStatus::Paused);
    assert!(handle.pause().is_err());

    // An in-flight page may still land; after that nothing moves
    tokio::time::sleep(Duration::from_millis(300)).await;
    drain(&mut handle, &mut events);
    let paused_pages = page_urls(&events).len();
    tokio::time::sleep(Duration::from_millis(400)).await;
    drain(&mut handle, &mut events);
    assert_eq!(page_urls(&events).len(), paused_pages);
    assert!(paused_pages < 5);

    handle.resume().expect("paused job can be resumed");
    let (rest, result) = handle.collect().await;
    events.extend(rest);
    let corpus = result.unwrap();

    let expected = vec![
        format!("{}/", base),
        format!("{}/about", base),
        format!("{}/services", base),
        format!("{}/blog", base),
        format!("{}/contact", base),
    ];
    assert_eq!(page_urls(&events), expected);
    let corpus_urls: Vec<_> = corpus.pages.iter().map(|p| p.url.clone()).collect();
    assert_eq!(corpus_urls, expected);
}

#[tokio::test]
async fn test_stop_keeps_partial_corpus() {
    let server = MockServer::start().await;
    mount_site(&server, None).await;

    let mut handle = start(create_test_config(&server.uri(), 10, 300)).unwrap();
    let mut events = wait_for_pages(&mut handle, 2).await;

    handle.stop().expect("running job can be stopped");
    let status = handle.controller();
    let (rest, result) = handle.collect().await;
    events.extend(rest);
    let corpus = result.expect("a stopped job still delivers its corpus");

    assert_eq!(status.status(), JobStatus::Stopped);
    assert_eq!(corpus.pages.len(), page_urls(&events).len());
    assert!(corpus.pages.len() < 5);
    assert!(matches!(events.last(), Some(CrawlEvent::Complete(_))));

    // Terminal jobs cannot be restarted
    assert!(status.resume().is_err());
    assert!(status.pause().is_err());
}

/// Allowance for fetch and parse time differing between consecutive pages
const TIMING_SLACK: Duration = Duration::from_millis(25);

#[tokio::test]
async fn test_crawl_delay_spaces_fetches() {
    let server = MockServer::start().await;
    mount_site(&server, None).await;
    let delay = Duration::from_millis(150);

    let started = Instant::now();
    let mut handle = start(create_test_config(&server.uri(), 10, 150)).unwrap();

    let mut crawled_at = Vec::new();
    while let Some(event) = handle.next_event().await {
        if let CrawlEvent::PageCrawled(_) = event {
            crawled_at.push(Instant::now());
        }
    }
    let corpus = handle.join().await.unwrap();
    assert_eq!(corpus.pages.len(), 5);
    assert_eq!(crawled_at.len(), 5);

    // Five fetch starts need at least four full delays between them
    assert!(
        crawled_at[4].duration_since(started) >= delay * 4,
        "crawl took only {:?}",
        crawled_at[4].duration_since(started)
    );
    for pair in crawled_at.windows(2) {
        let gap = pair[1].duration_since(pair[0]);
        assert!(gap + TIMING_SLACK >= delay, "pages only {:?} apart", gap);
    }
}

#[tokio::test]
async fn test_stop_interrupts_rate_limit_wait() {
    let server = MockServer::start().await;
    mount_site(&server, None).await;

    let mut handle = start(create_test_config(&server.uri(), 10, 5_000)).unwrap();
    let mut events = wait_for_pages(&mut handle, 1).await;

    let stopped_at = Instant::now();
    handle.stop().unwrap();
    let status = handle.controller();
    let (rest, result) = tokio::time::timeout(Duration::from_secs(2), handle.collect())
        .await
        .expect("stop should cut the rate-limit wait short");
    events.extend(rest);

    assert!(stopped_at.elapsed() < Duration::from_secs(2));
    assert_eq!(status.status(), JobStatus::Stopped);
    assert_eq!(result.unwrap().pages.len(), 1);
    assert_eq!(page_urls(&events).len(), 1);
    assert_eq!(last_progress(&events).fetched_count, 1);

    // The second page was never requested
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_directory_pages_resolve_relative_references() {
    let server = MockServer::start().await;
    let base = server.uri();
    let site = vec![
        (
            "/",
            html_page("Home", Some("Home"), r#"<a href="/news/">News</a>"#),
        ),
        (
            "/news/",
            html_page(
                "News",
                Some("All news"),
                r#"<img src="hero.jpg" alt="Hero">
                   <a href="first-post">First post</a>
                   <a href="report.pdf">Annual report</a>"#,
            ),
        ),
        (
            "/news/first-post",
            html_page("First post", Some("Hello"), r#"<a href="../">Back</a>"#),
        ),
    ];
    for (page_path, body) in site {
        Mock::given(method("GET"))
            .and(path(page_path))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
            .mount(&server)
            .await;
    }

    let handle = start(create_test_config(&base, 10, 0)).unwrap();
    let (events, result) = handle.collect().await;
    let corpus = result.unwrap();

    assert_eq!(
        page_urls(&events),
        vec![
            format!("{}/", base),
            format!("{}/news", base),
            format!("{}/news/first-post", base),
        ]
    );
    assert!(!events.iter().any(|e| matches!(e, CrawlEvent::Error { .. })));
    assert_eq!(corpus.images.len(), 1);
    assert_eq!(corpus.images[0].url, format!("{}/news/hero.jpg", base));
    assert_eq!(corpus.images[0].page_url, format!("{}/news", base));
    assert_eq!(corpus.documents[0].url, format!("{}/news/report.pdf", base));
}

#[tokio::test]
async fn test_missing_alt_text_reported() {
    let server = MockServer::start().await;
    mount_site(&server, None).await;
    let base = server.uri();

    let corpus = start(create_test_config(&base, 10, 0))
        .unwrap()
        .join()
        .await
        .unwrap();
    let report = synthesize_corpus(&corpus);

    assert_eq!(
        report.media_optimization.images_needing_alt_text,
        vec![format!("{}/img/team.jpg", base)]
    );
    assert_eq!(
        report.content_audit.missing_metadata,
        vec![format!("{}/about", base)]
    );
}

#[tokio::test]
async fn test_failing_page_reported_once() {
    let server = MockServer::start().await;
    mount_site(&server, Some("/contact")).await;
    let base = server.uri();

    let handle = start(create_test_config(&base, 10, 0)).unwrap();
    let status = handle.controller();
    let (events, result) = handle.collect().await;
    let corpus = result.unwrap();

    assert_eq!(status.status(), JobStatus::Completed);
    assert_eq!(corpus.pages.len(), 4);

    let errors: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            CrawlEvent::Error { url, message } => Some((url.clone(), message.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0, format!("{}/contact", base));
    assert!(errors[0].1.contains("500"));

    let progress = last_progress(&events);
    assert_eq!(progress.fetched_count, 5);
    assert_eq!(progress.errors, 1);
}

#[tokio::test]
async fn test_auth_token_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("authorization", "Bearer s3cret"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(html_page("Members", None, "<p>hello</p>"), "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri(), 5, 0);
    config.crawl.auth_token = Some("s3cret".to_string());
    config.crawl.require_auth = true;

    let corpus = start(config).unwrap().join().await.unwrap();
    assert_eq!(corpus.pages.len(), 1);
    assert_eq!(corpus.pages[0].title, "Members");
}

#[tokio::test]
async fn test_rejected_token_fails_job() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri(), 5, 0);
    config.crawl.auth_token = Some("expired".to_string());

    let handle = start(config).unwrap();
    let status = handle.controller();
    let (events, result) = handle.collect().await;

    assert!(matches!(result, Err(PorterError::Auth { status: 401, .. })));
    assert_eq!(status.status(), JobStatus::Failed);
    assert!(matches!(events.last(), Some(CrawlEvent::Failed { .. })));
    assert!(!events.iter().any(|e| matches!(e, CrawlEvent::Complete(_))));
}

#[tokio::test]
async fn test_unauthorized_without_token_is_per_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let handle = start(create_test_config(&server.uri(), 5, 0)).unwrap();
    let status = handle.controller();
    let (events, result) = handle.collect().await;

    let corpus = result.unwrap();
    assert!(corpus.pages.is_empty());
    assert_eq!(status.status(), JobStatus::Completed);
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, CrawlEvent::Error { .. }))
            .count(),
        1
    );
}

#[tokio::test]
async fn test_non_html_response_is_skipped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"<html><body><a href="/next">n</a></body></html>"#, "text/html"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/next"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json"))
        .mount(&server)
        .await;

    let handle = start(create_test_config(&server.uri(), 5, 0)).unwrap();
    let (events, result) = handle.collect().await;
    let corpus = result.unwrap();

    assert_eq!(corpus.pages.len(), 1);
    assert!(events.iter().any(|e| matches!(
        e,
        CrawlEvent::Error { url, message } if url.ends_with("/next") && message.contains("application/json")
    )));
}

#[tokio::test]
async fn test_invalid_config_never_starts() {
    let result = start(create_test_config("ftp://example.com/", 5, 0));
    assert!(matches!(result, Err(PorterError::Config(_))));
}
