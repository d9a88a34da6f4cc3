//! Asset extraction: images, videos and documents referenced by a page
//!
//! Each asset kind is recognized by a small ordered table (image context
//! markers, video platform hosts, document extensions) so the heuristics can
//! be read and extended in one place.

use crate::corpus::{
    DocumentAsset, DocumentType, ImageAsset, ImageContext, PageMedia, VideoAsset, VideoPlatform,
};
use crate::crawler::parser::collapse_whitespace;
use crate::url::{path_extension, resolve_url};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Image context markers, checked in order against the image and its ancestors
const IMAGE_CONTEXT_RULES: &[(ImageContext, &[&str])] = &[
    (ImageContext::Logo, &["logo", "brand"]),
    (
        ImageContext::Hero,
        &["hero", "banner", "masthead", "jumbotron", "splash"],
    ),
    (
        ImageContext::Gallery,
        &["gallery", "carousel", "slider", "slideshow", "lightbox", "swiper"],
    ),
];

/// Video platforms keyed by host (the host itself or any subdomain)
const VIDEO_PLATFORM_HOSTS: &[(VideoPlatform, &[&str])] = &[
    (
        VideoPlatform::Youtube,
        &["youtube.com", "youtu.be", "youtube-nocookie.com"],
    ),
    (VideoPlatform::Vimeo, &["vimeo.com"]),
    (VideoPlatform::Wistia, &["wistia.com", "wistia.net", "wi.st"]),
    (VideoPlatform::Loom, &["loom.com"]),
    (VideoPlatform::Dailymotion, &["dailymotion.com", "dai.ly"]),
    (VideoPlatform::Vidyard, &["vidyard.com"]),
];

/// Hints that an unrecognized embed is still a video player
const PLAYER_HINTS: &[&str] = &["video", "player"];

/// Document families by extension
const DOCUMENT_TYPES: &[(DocumentType, &[&str])] = &[
    (DocumentType::Pdf, &["pdf"]),
    (DocumentType::Word, &["doc", "docx", "odt", "rtf", "pages"]),
    (
        DocumentType::Spreadsheet,
        &["xls", "xlsx", "ods", "csv", "numbers"],
    ),
    (DocumentType::Presentation, &["ppt", "pptx", "odp", "key"]),
    (DocumentType::Text, &["txt", "md"]),
];

/// Extensions recognized as image formats
const IMAGE_FORMATS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "svg", "bmp", "ico", "tif", "tiff", "avif",
];

/// Assets found on a single page, each list unique by URL
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedAssets {
    pub images: Vec<ImageAsset>,
    pub videos: Vec<VideoAsset>,
    pub documents: Vec<DocumentAsset>,
}

impl ExtractedAssets {
    /// URLs of every asset, for the page's media summary
    pub fn media_summary(&self) -> PageMedia {
        PageMedia {
            images: self.images.iter().map(|i| i.url.clone()).collect(),
            videos: self.videos.iter().map(|v| v.url.clone()).collect(),
            documents: self.documents.iter().map(|d| d.url.clone()).collect(),
        }
    }

    /// Returns true if the page referenced no assets
    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.videos.is_empty() && self.documents.is_empty()
    }
}

/// Extracts every image, video and document referenced by a parsed page
///
/// # Arguments
///
/// * `document` - The parsed page
/// * `base` - URL relative references resolve against
/// * `page_url` - URL recorded as each asset's `page_url`
/// * `document_extensions` - Link extensions recorded as documents
pub fn extract_assets(
    document: &Html,
    base: &Url,
    page_url: &Url,
    document_extensions: &[String],
) -> ExtractedAssets {
    ExtractedAssets {
        images: extract_images(document, base, page_url),
        videos: extract_videos(document, base, page_url),
        documents: extract_documents(document, base, page_url, document_extensions),
    }
}

fn extract_images(document: &Html, base: &Url, page_url: &Url) -> Vec<ImageAsset> {
    let Ok(selector) = Selector::parse("img") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut images = Vec::new();

    for img in document.select(&selector) {
        let Some(src) = image_source(&img) else {
            continue;
        };
        let Ok(url) = resolve_url(base, src) else {
            continue;
        };
        if !seen.insert(url.to_string()) {
            continue;
        }

        let attr = |name: &str| img.value().attr(name);
        images.push(ImageAsset {
            url: url.to_string(),
            alt: attr("alt").map(collapse_whitespace).unwrap_or_default(),
            title: attr("title")
                .map(collapse_whitespace)
                .filter(|t| !t.is_empty()),
            context: image_context(&img),
            width: attr("width").and_then(parse_dimension),
            height: attr("height").and_then(parse_dimension),
            format: path_extension(&url).filter(|ext| IMAGE_FORMATS.contains(&ext.as_str())),
            file_size: None,
            page_url: page_url.to_string(),
            downloaded: false,
        });
    }

    images
}

/// Picks the real source of an image, looking through lazy-loading attributes
fn image_source<'a>(img: &ElementRef<'a>) -> Option<&'a str> {
    let element = img.value();
    ["src", "data-src", "data-lazy-src"]
        .iter()
        .filter_map(|name| element.attr(name))
        .map(str::trim)
        .find(|src| !src.is_empty() && !src.starts_with("data:"))
        .or_else(|| {
            element
                .attr("srcset")
                .and_then(|srcset| srcset.split(',').next())
                .and_then(|candidate| candidate.split_whitespace().next())
                .filter(|src| !src.starts_with("data:"))
        })
}

/// Classifies an image by markers on the image itself, then on its ancestors
fn image_context(img: &ElementRef<'_>) -> ImageContext {
    let element = img.value();
    let own = [
        element.attr("class"),
        element.attr("id"),
        element.attr("alt"),
        element.attr("src"),
    ]
    .iter()
    .flatten()
    .map(|s| s.to_lowercase())
    .collect::<Vec<_>>()
    .join(" ");

    if let Some(context) = match_context(&own) {
        return context;
    }

    for ancestor in img.ancestors().filter_map(ElementRef::wrap) {
        let value = ancestor.value();
        if value.name() == "body" {
            break;
        }
        let haystack = [Some(value.name()), value.attr("class"), value.attr("id")]
            .iter()
            .flatten()
            .map(|s| s.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");
        if let Some(context) = match_context(&haystack) {
            return context;
        }
    }

    ImageContext::Content
}

fn match_context(haystack: &str) -> Option<ImageContext> {
    IMAGE_CONTEXT_RULES
        .iter()
        .find(|(_, markers)| markers.iter().any(|m| haystack.contains(m)))
        .map(|(context, _)| *context)
}

/// Parses a width/height attribute such as `640` or `640px`
fn parse_dimension(value: &str) -> Option<u32> {
    let value = value.trim();
    let digits = value.trim_end_matches("px");
    digits.parse().ok().filter(|n| *n > 0)
}

fn extract_videos(document: &Html, base: &Url, page_url: &Url) -> Vec<VideoAsset> {
    let Ok(selector) = Selector::parse("iframe, embed, object, video") else {
        return Vec::new();
    };
    let source_selector = Selector::parse("source[src]").ok();

    let mut seen = HashSet::new();
    let mut videos = Vec::new();

    for element in document.select(&selector) {
        let value = element.value();
        let tag = value.name();

        let src = match tag {
            "object" => value.attr("data"),
            "video" => value.attr("src").or_else(|| {
                source_selector.as_ref().and_then(|s| {
                    element
                        .select(s)
                        .find_map(|source| source.value().attr("src"))
                })
            }),
            _ => value.attr("src").or_else(|| value.attr("data-src")),
        };
        let Some(src) = src else {
            continue;
        };
        let Ok(url) = resolve_url(base, src) else {
            continue;
        };

        let platform = match detect_platform(&url) {
            Some(platform) => platform,
            None if tag == "video" => VideoPlatform::SelfHosted,
            None if looks_like_player(&element, &url) => VideoPlatform::Other,
            None => continue,
        };

        if !seen.insert(url.to_string()) {
            continue;
        }

        let thumbnail = if tag == "video" {
            value
                .attr("poster")
                .and_then(|poster| resolve_url(base, poster).ok())
                .map(|u| u.to_string())
        } else {
            None
        };

        videos.push(VideoAsset {
            url: url.to_string(),
            platform,
            video_id: video_id(platform, &url),
            title: value
                .attr("title")
                .map(collapse_whitespace)
                .filter(|t| !t.is_empty()),
            thumbnail,
            page_url: page_url.to_string(),
            downloaded: false,
        });
    }

    videos
}

/// Identifies the hosting platform from the URL host
pub fn detect_platform(url: &Url) -> Option<VideoPlatform> {
    let host = url.host_str()?.to_ascii_lowercase();
    VIDEO_PLATFORM_HOSTS
        .iter()
        .find(|(_, hosts)| {
            hosts
                .iter()
                .any(|h| host == *h || host.ends_with(&format!(".{}", h)))
        })
        .map(|(platform, _)| *platform)
}

fn looks_like_player(element: &ElementRef<'_>, url: &Url) -> bool {
    let value = element.value();
    if value
        .attr("type")
        .map_or(false, |t| t.trim().to_ascii_lowercase().starts_with("video/"))
    {
        return true;
    }
    let haystack = format!(
        "{} {} {}",
        url.as_str(),
        value.attr("title").unwrap_or(""),
        value.attr("class").unwrap_or("")
    )
    .to_lowercase();
    PLAYER_HINTS.iter().any(|hint| haystack.contains(hint))
}

/// Extracts the platform-specific video ID for YouTube and Vimeo URLs
pub fn video_id(platform: VideoPlatform, url: &Url) -> Option<String> {
    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    let id = match platform {
        VideoPlatform::Youtube => {
            if url.host_str().map_or(false, |h| h.ends_with("youtu.be")) {
                return segments.first().map(|s| s.to_string());
            }
            match segments.as_slice() {
                ["watch", ..] => url
                    .query_pairs()
                    .find(|(k, _)| k == "v")
                    .map(|(_, v)| v.into_owned()),
                ["embed" | "shorts" | "v" | "live", id, ..] => Some(id.to_string()),
                _ => None,
            }
        }
        VideoPlatform::Vimeo => segments
            .iter()
            .rev()
            .find(|s| s.chars().all(|c| c.is_ascii_digit()))
            .map(|s| s.to_string()),
        _ => None,
    };
    id.filter(|id| !id.is_empty())
}

fn extract_documents(
    document: &Html,
    base: &Url,
    page_url: &Url,
    document_extensions: &[String],
) -> Vec<DocumentAsset> {
    if document_extensions.is_empty() {
        return Vec::new();
    }
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut documents = Vec::new();

    for anchor in document.select(&selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Ok(url) = resolve_url(base, href) else {
            continue;
        };
        let Some(extension) = path_extension(&url) else {
            continue;
        };
        if !document_extensions
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(&extension))
        {
            continue;
        }
        if !seen.insert(url.to_string()) {
            continue;
        }

        let text = collapse_whitespace(&anchor.text().collect::<String>());
        let title = if !text.is_empty() {
            text
        } else {
            anchor
                .value()
                .attr("title")
                .map(collapse_whitespace)
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| file_name(&url))
        };

        documents.push(DocumentAsset {
            url: url.to_string(),
            file_type: document_type(&extension),
            extension,
            title,
            file_size: None,
            page_url: page_url.to_string(),
            downloaded: false,
        });
    }

    documents
}

/// Maps a lowercase extension to its document family
pub fn document_type(extension: &str) -> DocumentType {
    DOCUMENT_TYPES
        .iter()
        .find(|(_, exts)| exts.contains(&extension))
        .map(|(doc_type, _)| *doc_type)
        .unwrap_or(DocumentType::Other)
}

fn file_name(url: &Url) -> String {
    url.path_segments()
        .and_then(|s| s.last())
        .unwrap_or_default()
        .to_string()
}
