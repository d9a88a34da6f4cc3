use url::Url;

/// Extensions dropped from the last path segment before slugging
const PAGE_EXTENSIONS: &[&str] = &["html", "htm", "php", "asp", "aspx", "jsp", "shtml"];

/// Last-segment names that stand for their parent directory
const INDEX_NAMES: &[&str] = &["index", "default", "home"];

/// Derives a URL-safe slug from the path of `url`
///
/// The path is lowercased, every run of characters outside `[a-z0-9]`
/// becomes a single `-`, and leading/trailing separators are trimmed. Page
/// extensions and index documents are dropped, so the site root (and
/// `/index.html`) maps to the empty home slug. Query and fragment are
/// ignored.
///
/// # Examples
///
/// ```
/// use site_porter::url::slug_for;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/Blog/My_First--Post.html").unwrap();
/// assert_eq!(slug_for(&url), "blog-my-first-post");
///
/// let root = Url::parse("https://example.com/").unwrap();
/// assert_eq!(slug_for(&root), "");
/// ```
pub fn slug_for(url: &Url) -> String {
    let mut segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    if let Some(last) = segments.pop() {
        let stem = match last.rsplit_once('.') {
            Some((stem, ext)) if PAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) => {
                stem
            }
            _ => last,
        };
        if !INDEX_NAMES.contains(&stem.to_ascii_lowercase().as_str()) {
            segments.push(stem);
        }
    }

    let mut slug = String::new();
    let mut pending_separator = false;

    for c in segments.join("/").chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    slug
}
