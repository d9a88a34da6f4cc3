//! URL handling module for Site-Porter
//!
//! This module provides URL normalization, origin checks, file-extension
//! helpers and slug derivation.

mod normalize;
mod slug;

pub use normalize::{normalize_url, resolve_link, resolve_url};
pub use slug::slug_for;

use url::Url;

/// Extensions that never identify an HTML page
///
/// Links ending in one of these are assets, not crawl targets. Document
/// extensions are configured separately and checked by the crawler.
const NON_PAGE_EXTENSIONS: &[&str] = &[
    // images
    "jpg", "jpeg", "png", "gif", "webp", "svg", "bmp", "ico", "tif", "tiff", "avif",
    // audio / video
    "mp4", "webm", "mov", "avi", "mkv", "m4v", "mp3", "wav", "ogg",
    // archives and binaries
    "zip", "rar", "7z", "gz", "tar", "exe", "dmg", "iso",
    // static resources
    "css", "js", "json", "xml", "woff", "woff2", "ttf", "eot",
];

/// Returns true if both URLs share scheme, host and port
///
/// # Examples
///
/// ```
/// use site_porter::url::is_same_origin;
/// use url::Url;
///
/// let a = Url::parse("https://example.com/a").unwrap();
/// let b = Url::parse("https://example.com:443/b").unwrap();
/// let c = Url::parse("http://example.com/a").unwrap();
/// assert!(is_same_origin(&a, &b));
/// assert!(!is_same_origin(&a, &c));
/// ```
pub fn is_same_origin(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin()
}

/// Returns the lowercase extension of the last path segment, if any
pub fn path_extension(url: &Url) -> Option<String> {
    let last = url.path_segments()?.last()?;
    let (stem, ext) = last.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Returns true if the URL may point at an HTML page
pub fn is_page_candidate(url: &Url) -> bool {
    match path_extension(url) {
        Some(ext) => !NON_PAGE_EXTENSIONS.contains(&ext.as_str()),
        None => true,
    }
}
