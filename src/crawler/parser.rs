//! HTML parser for turning a fetched page into a `CrawledPage`
//!
//! This module handles parsing HTML content to extract:
//! - Page title and head metadata (description, Open Graph, canonical, ...)
//! - Visible text, for word counts and excerpts
//! - Same-origin links to feed the frontier
//! - Embedded assets (delegated to the asset extractor)
//!
//! Parsing never aborts a page. Content that is not markup at all produces a
//! `Parse` error, which the crawler turns into a degraded page via
//! [`degraded_page`].

use crate::corpus::{CrawledPage, PageMetadata};
use crate::crawler::assets::{extract_assets, ExtractedAssets};
use crate::crawler::classifier::classify_page;
use crate::url::{is_same_origin, normalize_url, resolve_link, resolve_url, slug_for};
use crate::PorterError;
use chrono::Utc;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Elements whose text is never visible
const HIDDEN_TEXT_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "svg", "head"];

/// Maximum length of the stored text excerpt, in characters
const EXCERPT_CHARS: usize = 300;

/// Everything extracted from one page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// The classified page record, media summary included
    pub page: CrawledPage,

    /// Same-origin links in document order, absolute and deduplicated
    ///
    /// Links keep the form they were written in (only the fragment is
    /// dropped); the frontier normalizes them.
    pub links: Vec<String>,

    /// Assets referenced by the page
    pub assets: ExtractedAssets,
}

/// Parses HTML content into a page record, its links and its assets
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags anywhere in the document
/// - `<link rel="canonical" href="...">`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links and data URIs
/// - Fragment-only links (same page anchors)
/// - Links leaving the page's origin
///
/// Relative links and assets resolve against `<base href>` when present,
/// otherwise against `document_url`.
///
/// # Arguments
///
/// * `url` - The page's normalized URL, recorded as its identity
/// * `document_url` - Where the content was actually served from (after
///   redirects, trailing slash intact)
/// * `html` - The raw page content
/// * `document_extensions` - Link extensions recorded as documents
///
/// # Returns
///
/// * `Ok(ParsedPage)` - Parsed page
/// * `Err(PorterError::Parse)` - The content is empty or not markup
///
/// # Example
///
/// ```
/// use site_porter::crawler::parse_page;
/// use url::Url;
///
/// let html = r#"<html><head><title>About us</title></head><body><a href="team">Team</a></body></html>"#;
/// let url = Url::parse("https://example.com/about").unwrap();
/// let served_from = Url::parse("https://example.com/about/").unwrap();
/// let parsed = parse_page(&url, &served_from, html, &[]).unwrap();
/// assert_eq!(parsed.page.url, "https://example.com/about");
/// assert_eq!(parsed.page.title, "About us");
/// assert_eq!(parsed.links, vec!["https://example.com/about/team".to_string()]);
/// ```
pub fn parse_page(
    url: &Url,
    document_url: &Url,
    html: &str,
    document_extensions: &[String],
) -> Result<ParsedPage, PorterError> {
    if html.trim().is_empty() {
        return Err(PorterError::Parse {
            url: url.to_string(),
            message: "empty document".to_string(),
        });
    }
    if !html.contains('<') {
        return Err(PorterError::Parse {
            url: url.to_string(),
            message: "content contains no markup".to_string(),
        });
    }

    let document = Html::parse_document(html);
    let base = base_url(&document, document_url);

    let metadata = extract_metadata(&document, &base);
    let title = extract_title(&document, &metadata);
    let text = visible_text(&document);
    let word_count = text.split_whitespace().count();

    let classification_text = match metadata.headings.first() {
        Some(heading) if !title.contains(heading.as_str()) => format!("{} {}", title, heading),
        _ => title.clone(),
    };

    let assets = extract_assets(&document, &base, url, document_extensions);
    let links = extract_links(&document, &base, url);

    let page = CrawledPage {
        url: url.to_string(),
        slug: slug_for(url),
        title,
        page_type: classify_page(url, &classification_text),
        word_count,
        metadata: PageMetadata {
            excerpt: excerpt(&text),
            ..metadata
        },
        media: assets.media_summary(),
        crawled_at: Utc::now(),
    };

    Ok(ParsedPage {
        page,
        links,
        assets,
    })
}

/// Builds the best-effort record for a page whose content could not be parsed
///
/// The page keeps its URL, slug and URL-based classification; title,
/// description and word count are empty.
pub fn degraded_page(url: &Url) -> CrawledPage {
    CrawledPage {
        url: url.to_string(),
        slug: slug_for(url),
        title: String::new(),
        page_type: classify_page(url, ""),
        word_count: 0,
        metadata: PageMetadata::default(),
        media: Default::default(),
        crawled_at: Utc::now(),
    }
}

/// Resolves the document base: `<base href>` if usable, else the page URL
fn base_url(document: &Html, url: &Url) -> Url {
    first_attr(document, "base[href]", "href")
        .and_then(|href| url.join(&href).ok())
        .filter(|base| base.scheme() == "http" || base.scheme() == "https")
        .unwrap_or_else(|| url.clone())
}

/// Extracts the page title
///
/// Falls back to `og:title`, then to the first `<h1>`. Empty if none exist.
fn extract_title(document: &Html, metadata: &PageMetadata) -> String {
    select_text(document, "title")
        .or_else(|| metadata.og_title.clone())
        .or_else(|| metadata.headings.first().cloned())
        .unwrap_or_default()
}

/// Extracts head metadata and `<h1>` headings
fn extract_metadata(document: &Html, base: &Url) -> PageMetadata {
    let description = meta_content(document, "meta[name='description']")
        .or_else(|| meta_content(document, "meta[property='og:description']"));

    let og_image = meta_content(document, "meta[property='og:image']")
        .and_then(|src| resolve_url(base, &src).ok())
        .map(|u| u.to_string());

    let canonical = first_attr(document, "link[rel='canonical'][href]", "href")
        .and_then(|href| resolve_url(base, &href).ok())
        .map(|u| u.to_string());

    let language = first_attr(document, "html[lang]", "lang")
        .map(|lang| lang.trim().to_string())
        .filter(|lang| !lang.is_empty());

    let headings = match Selector::parse("h1") {
        Ok(selector) => document
            .select(&selector)
            .map(|h| collapse_whitespace(&h.text().collect::<String>()))
            .filter(|h| !h.is_empty())
            .collect(),
        Err(_) => Vec::new(),
    };

    PageMetadata {
        description,
        keywords: meta_content(document, "meta[name='keywords']"),
        og_title: meta_content(document, "meta[property='og:title']"),
        og_image,
        canonical,
        language,
        headings,
        excerpt: String::new(),
    }
}

/// Extracts all same-origin links from the document
fn extract_links(document: &Html, base: &Url, page_url: &Url) -> Vec<String> {
    let mut links = Vec::new();
    let mut seen = HashSet::new();

    let mut push = |href: &str| {
        if href.trim_start().starts_with('#') {
            return;
        }
        let Ok(absolute) = resolve_link(base, href) else {
            return;
        };
        if !is_same_origin(&absolute, page_url) {
            return;
        }
        if let Ok(key) = normalize_url(absolute.as_str()) {
            if seen.insert(key.to_string()) {
                links.push(absolute.to_string());
            }
        }
    };

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if element.value().attr("download").is_some() {
                continue;
            }
            if let Some(href) = element.value().attr("href") {
                push(href);
            }
        }
    }

    if let Ok(canonical_selector) = Selector::parse("link[rel='canonical'][href]") {
        for element in document.select(&canonical_selector) {
            if let Some(href) = element.value().attr("href") {
                push(href);
            }
        }
    }

    links
}

/// Collects the visible text of the document body, whitespace-collapsed
fn visible_text(document: &Html) -> String {
    let root = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next())
        .unwrap_or_else(|| document.root_element());

    let mut chunks = Vec::new();
    collect_visible_text(root, &mut chunks);
    collapse_whitespace(&chunks.join(" "))
}

fn collect_visible_text(element: ElementRef<'_>, chunks: &mut Vec<String>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            chunks.push((**text).to_owned());
        } else if let Some(child_element) = ElementRef::wrap(child) {
            if !HIDDEN_TEXT_ELEMENTS.contains(&child_element.value().name()) {
                collect_visible_text(child_element, chunks);
            }
        }
    }
}

fn excerpt(text: &str) -> String {
    match text.char_indices().nth(EXCERPT_CHARS) {
        Some((idx, _)) => format!("{}…", text[..idx].trim_end()),
        None => text.to_string(),
    }
}

fn meta_content(document: &Html, selector: &str) -> Option<String> {
    first_attr(document, selector, "content")
        .map(|content| collapse_whitespace(&content))
        .filter(|content| !content.is_empty())
}

fn first_attr(document: &Html, selector: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .find_map(|element| element.value().attr(attr).map(str::to_string))
}

fn select_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .filter(|s| !s.is_empty())
}

/// Collapses runs of whitespace to single spaces and trims
pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::PageType;

    fn page_url() -> Url {
        Url::parse("https://example.com/page").unwrap()
    }

    fn parse(html: &str) -> ParsedPage {
        parse_page(&page_url(), &page_url(), html, &["pdf".to_string()]).unwrap()
    }

    #[test]
    fn test_extract_title() {
        let parsed = parse("<html><head><title>  Test   Page </title></head><body></body></html>");
        assert_eq!(parsed.page.title, "Test Page");
    }

    #[test]
    fn test_title_falls_back_to_heading() {
        let parsed = parse("<html><body><h1>Our Services</h1></body></html>");
        assert_eq!(parsed.page.title, "Our Services");
        assert_eq!(parsed.page.metadata.headings, vec!["Our Services"]);
        assert_eq!(parsed.page.page_type, PageType::Services);
    }

    #[test]
    fn test_no_title() {
        let parsed = parse("<html><head></head><body><p>text</p></body></html>");
        assert_eq!(parsed.page.title, "");
    }

    #[test]
    fn test_word_count_skips_hidden_content() {
        let html = r#"<html><head><title>Ignored title words</title>
            <style>body { color: red; }</style></head>
            <body>
              <p>One two three</p>
              <script>var notCounted = "a b c d";</script>
              <noscript>enable javascript please</noscript>
              <div>four <b>five</b></div>
            </body></html>"#;
        let parsed = parse(html);
        assert_eq!(parsed.page.word_count, 5);
        assert_eq!(parsed.page.metadata.excerpt, "One two three four five");
    }

    #[test]
    fn test_description_extraction() {
        let parsed = parse(
            r#"<html><head><meta name="description" content=" We build  bridges. "></head><body></body></html>"#,
        );
        assert_eq!(
            parsed.page.metadata.description.as_deref(),
            Some("We build bridges.")
        );

        let parsed = parse(
            r#"<html><head><meta property="og:description" content="From OG"></head><body></body></html>"#,
        );
        assert_eq!(parsed.page.metadata.description.as_deref(), Some("From OG"));

        let parsed = parse(r#"<html><head><meta name="description" content=""></head></html>"#);
        assert_eq!(parsed.page.metadata.description, None);
    }

    #[test]
    fn test_head_metadata() {
        let html = r#"<html lang="en-GB"><head>
            <meta name="keywords" content="bridges, steel">
            <meta property="og:title" content="OG Title">
            <meta property="og:image" content="/img/share.png">
            <link rel="canonical" href="/page/">
            </head><body></body></html>"#;
        let metadata = parse(html).page.metadata;
        assert_eq!(metadata.keywords.as_deref(), Some("bridges, steel"));
        assert_eq!(metadata.og_title.as_deref(), Some("OG Title"));
        assert_eq!(
            metadata.og_image.as_deref(),
            Some("https://example.com/img/share.png")
        );
        assert_eq!(metadata.canonical.as_deref(), Some("https://example.com/page"));
        assert_eq!(metadata.language.as_deref(), Some("en-GB"));
    }

    #[test]
    fn test_links_are_same_origin_and_deduplicated() {
        let html = r##"<html><body>
            <a href="/about">About</a>
            <a href="/about/">About again</a>
            <a href="https://other.com/page">External</a>
            <a href="#top">Top</a>
            <a href="mailto:hi@example.com">Mail</a>
            <a href="javascript:void(0)">JS</a>
            <a href="/file.pdf" download>Download</a>
            <a href="contact">Relative</a>
            </body></html>"##;
        let parsed = parse(html);
        assert_eq!(
            parsed.links,
            vec![
                "https://example.com/about".to_string(),
                "https://example.com/contact".to_string(),
            ]
        );
    }

    #[test]
    fn test_base_href_used_for_resolution() {
        let html = r#"<html><head><base href="https://example.com/docs/"></head>
            <body><a href="intro">Intro</a></body></html>"#;
        let parsed = parse(html);
        assert_eq!(parsed.links, vec!["https://example.com/docs/intro".to_string()]);
    }

    #[test]
    fn test_directory_page_resolves_against_served_url() {
        let url = normalize_url("https://example.com/blog/").unwrap();
        let served_from = Url::parse("https://example.com/blog/").unwrap();
        let html = r#"<html><body>
            <a href="first-post">First</a>
            <img src="hero.jpg" alt="Hero">
            <a href="guide.pdf">Guide</a>
            </body></html>"#;
        let parsed = parse_page(&url, &served_from, html, &["pdf".to_string()]).unwrap();

        assert_eq!(parsed.page.url, "https://example.com/blog");
        assert_eq!(parsed.page.slug, "blog");
        assert_eq!(
            parsed.links,
            vec![
                "https://example.com/blog/first-post".to_string(),
                "https://example.com/blog/guide.pdf".to_string(),
            ]
        );
        assert_eq!(parsed.assets.images[0].url, "https://example.com/blog/hero.jpg");
        assert_eq!(parsed.assets.images[0].page_url, "https://example.com/blog");
        assert_eq!(
            parsed.assets.documents[0].url,
            "https://example.com/blog/guide.pdf"
        );
    }

    #[test]
    fn test_redirected_page_resolves_against_final_url() {
        let url = Url::parse("https://example.com/old-news").unwrap();
        let served_from = Url::parse("https://example.com/news/2024/").unwrap();
        let parsed = parse_page(
            &url,
            &served_from,
            r#"<html><body><a href="spring">Spring</a></body></html>"#,
            &[],
        )
        .unwrap();

        assert_eq!(parsed.page.url, "https://example.com/old-news");
        assert_eq!(
            parsed.links,
            vec!["https://example.com/news/2024/spring".to_string()]
        );
    }

    #[test]
    fn test_slug_and_type_from_url() {
        let url = Url::parse("https://example.com/Case-Studies/Acme_Corp").unwrap();
        let parsed = parse_page(&url, &url, "<html><body>x</body></html>", &[]).unwrap();
        assert_eq!(parsed.page.slug, "case-studies-acme-corp");
        assert_eq!(parsed.page.page_type, PageType::CaseStudy);
    }

    #[test]
    fn test_media_summary_filled() {
        let html = r#"<html><body>
            <img src="/a.png" alt="A">
            <a href="/brochure.pdf">Brochure</a>
            </body></html>"#;
        let parsed = parse(html);
        assert_eq!(parsed.page.media.images, vec!["https://example.com/a.png"]);
        assert_eq!(
            parsed.page.media.documents,
            vec!["https://example.com/brochure.pdf"]
        );
    }

    #[test]
    fn test_non_markup_is_parse_error() {
        let result = parse_page(&page_url(), &page_url(), "   ", &[]);
        assert!(matches!(result, Err(PorterError::Parse { .. })));

        let result = parse_page(&page_url(), &page_url(), "just some plain text", &[]);
        assert!(matches!(result, Err(PorterError::Parse { .. })));
    }

    #[test]
    fn test_malformed_markup_is_best_effort() {
        let parsed = parse("<html><body><p>unclosed <div>tags here");
        assert_eq!(parsed.page.word_count, 3);
        assert_eq!(parsed.page.title, "");
    }

    #[test]
    fn test_degraded_page() {
        let url = Url::parse("https://example.com/contact").unwrap();
        let page = degraded_page(&url);
        assert_eq!(page.title, "");
        assert_eq!(page.word_count, 0);
        assert_eq!(page.metadata.description, None);
        assert_eq!(page.slug, "contact");
        assert_eq!(page.page_type, PageType::Contact);
    }

    #[test]
    fn test_excerpt_truncates_on_char_boundary() {
        let text = "é".repeat(400);
        let result = excerpt(&text);
        assert_eq!(result.chars().count(), EXCERPT_CHARS + 1);
        assert!(result.ends_with('…'));
    }
}
