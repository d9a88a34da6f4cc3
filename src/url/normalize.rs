use crate::{UrlError, UrlResult};
use url::Url;

/// List of tracking query parameters to remove during normalization
const TRACKING_PARAMS: &[&str] = &[
    "fbclid", "gclid", "msclkid", "mc_cid", "mc_eid", "_ga", "_hsenc", "_hsmi",
];

/// Normalizes an absolute URL according to Site-Porter's normalization rules
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject anything that is not HTTP(S) or has no host
/// 3. Normalize path:
///    - Remove dot segments (. and ..) and empty segments
///    - Remove trailing slash (except for root /)
///    - Empty path becomes /
/// 4. Remove fragment (everything after #)
/// 5. Remove tracking query parameters
/// 6. Sort remaining query parameters alphabetically
/// 7. Remove empty query string (trailing ?)
///
/// The host is lowercased by the URL parser itself. Scheme and `www.` are
/// left alone: they are part of the origin the crawl is confined to.
///
/// # Examples
///
/// ```
/// use site_porter::url::normalize_url;
///
/// let url = normalize_url("https://EXAMPLE.com/About/?utm_source=x#team").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/About");
/// ```
pub fn normalize_url(url_str: &str) -> UrlResult<Url> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    normalize_parsed(url)
}

/// Resolves `href` against `base` and normalizes the result
///
/// Relative references, protocol-relative references and absolute URLs are
/// all accepted. `javascript:`, `mailto:`, `tel:` and `data:` references
/// fail with `InvalidScheme`.
pub fn resolve_url(base: &Url, href: &str) -> UrlResult<Url> {
    normalize_parsed(resolve_link(base, href)?)
}

/// Resolves `href` against `base` without normalizing the path or query
///
/// Only the fragment is dropped. The result is the address to request:
/// a trailing slash still matters to the server and to relative references
/// inside the document it serves.
///
/// # Examples
///
/// ```
/// use site_porter::url::resolve_link;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/blog/").unwrap();
/// let link = resolve_link(&base, "first-post/#comments").unwrap();
/// assert_eq!(link.as_str(), "https://example.com/blog/first-post/");
/// ```
pub fn resolve_link(base: &Url, href: &str) -> UrlResult<Url> {
    let href = href.trim();
    if href.is_empty() {
        return Err(UrlError::Parse("empty reference".to_string()));
    }

    let mut url = base
        .join(href)
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;
    check_web_url(&url)?;
    url.set_fragment(None);
    Ok(url)
}

fn check_web_url(url: &Url) -> UrlResult<()> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }
    Ok(())
}

fn normalize_parsed(mut url: Url) -> UrlResult<Url> {
    check_web_url(&url)?;

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);

    url.set_fragment(None);

    if url.query().is_some() {
        let filtered_params = filter_and_sort_query_params(&url);

        if filtered_params.is_empty() {
            url.set_query(None);
        } else {
            let mut serializer = url::form_urlencoded::Serializer::new(String::new());
            for (k, v) in &filtered_params {
                serializer.append_pair(k, v);
            }
            url.set_query(Some(&serializer.finish()));
        }
    }

    Ok(url)
}

/// Normalizes a URL path by removing dot segments and trailing slashes
fn normalize_path(path: &str) -> String {
    let mut normalized_segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                normalized_segments.pop();
            }
            _ => normalized_segments.push(segment),
        }
    }

    if normalized_segments.is_empty() {
        return "/".to_string();
    }

    format!("/{}", normalized_segments.join("/"))
}

/// Filters out tracking parameters and sorts remaining query parameters
fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    params.sort();
    params
}

/// Checks if a query parameter is a tracking parameter
fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || key.starts_with("utm_")
}
