//! Page-type classification
//!
//! Classification walks an ordered rule table and returns the label of the
//! first rule that matches. URL rules come before title rules, so a page at
//! `/blog/contact-tips` is a blog post even though its title says "contact".

use crate::corpus::PageType;
use url::Url;

/// What a classification rule looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleMatcher {
    /// The site root (`/`, or an index document at the root)
    Root,

    /// Any path segment equals one of these (case-insensitive)
    PathSegment(&'static [&'static str]),

    /// The title or first heading contains one of these words
    TitleKeyword(&'static [&'static str]),
}

/// A single pattern-to-label rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationRule {
    pub matcher: RuleMatcher,
    pub label: PageType,
}

const fn rule(matcher: RuleMatcher, label: PageType) -> ClassificationRule {
    ClassificationRule { matcher, label }
}

/// Root documents that count as the home page
const ROOT_DOCUMENTS: &[&str] = &["index.html", "index.htm", "index.php", "home"];

/// Ordered page-type rules; the first match wins
pub const PAGE_TYPE_RULES: &[ClassificationRule] = &[
    rule(RuleMatcher::Root, PageType::Home),
    rule(
        RuleMatcher::PathSegment(&[
            "case-studies",
            "case-study",
            "casestudies",
            "success-stories",
            "portfolio",
            "our-work",
            "work",
            "projects",
        ]),
        PageType::CaseStudy,
    ),
    rule(
        RuleMatcher::PathSegment(&[
            "contact",
            "contact-us",
            "contactus",
            "get-in-touch",
            "locations",
        ]),
        PageType::Contact,
    ),
    rule(
        RuleMatcher::PathSegment(&[
            "privacy",
            "privacy-policy",
            "terms",
            "terms-of-service",
            "terms-and-conditions",
            "legal",
            "cookies",
            "cookie-policy",
            "disclaimer",
            "accessibility",
        ]),
        PageType::Legal,
    ),
    rule(
        RuleMatcher::PathSegment(&[
            "blog", "news", "articles", "article", "posts", "post", "insights", "press",
            "updates", "stories",
        ]),
        PageType::Blog,
    ),
    rule(
        RuleMatcher::PathSegment(&[
            "services",
            "service",
            "solutions",
            "what-we-do",
            "products",
            "offerings",
            "capabilities",
            "pricing",
        ]),
        PageType::Services,
    ),
    rule(
        RuleMatcher::PathSegment(&[
            "resources",
            "resource",
            "downloads",
            "guides",
            "whitepapers",
            "ebooks",
            "webinars",
            "faq",
            "faqs",
            "help",
            "docs",
            "library",
        ]),
        PageType::Resources,
    ),
    rule(
        RuleMatcher::PathSegment(&[
            "about",
            "about-us",
            "aboutus",
            "company",
            "who-we-are",
            "our-story",
            "team",
            "our-team",
            "leadership",
            "careers",
            "history",
            "mission",
        ]),
        PageType::About,
    ),
    rule(
        RuleMatcher::TitleKeyword(&["case study", "case studies", "success story"]),
        PageType::CaseStudy,
    ),
    rule(
        RuleMatcher::TitleKeyword(&["contact", "get in touch"]),
        PageType::Contact,
    ),
    rule(
        RuleMatcher::TitleKeyword(&["privacy policy", "terms of service", "terms and conditions", "cookie policy"]),
        PageType::Legal,
    ),
    rule(
        RuleMatcher::TitleKeyword(&["blog", "news"]),
        PageType::Blog,
    ),
    rule(
        RuleMatcher::TitleKeyword(&["services", "solutions", "what we do"]),
        PageType::Services,
    ),
    rule(
        RuleMatcher::TitleKeyword(&["resources", "downloads", "faq"]),
        PageType::Resources,
    ),
    rule(
        RuleMatcher::TitleKeyword(&["about", "our team", "who we are"]),
        PageType::About,
    ),
];

impl ClassificationRule {
    /// Returns true if this rule matches the page
    pub fn matches(&self, segments: &[String], title: &str) -> bool {
        match self.matcher {
            RuleMatcher::Root => {
                segments.is_empty()
                    || (segments.len() == 1 && ROOT_DOCUMENTS.contains(&segments[0].as_str()))
            }
            RuleMatcher::PathSegment(patterns) => segments
                .iter()
                .any(|segment| patterns.contains(&segment.as_str())),
            RuleMatcher::TitleKeyword(keywords) => {
                keywords.iter().any(|keyword| contains_phrase(title, keyword))
            }
        }
    }
}

/// Classifies a page with the default rule table
///
/// # Arguments
///
/// * `url` - The page URL
/// * `title` - The page title or main heading (may be empty)
///
/// # Examples
///
/// ```
/// use site_porter::corpus::PageType;
/// use site_porter::crawler::classify_page;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/blog/launch-day").unwrap();
/// assert_eq!(classify_page(&url, "Launch day"), PageType::Blog);
/// ```
pub fn classify_page(url: &Url, title: &str) -> PageType {
    classify_with(PAGE_TYPE_RULES, url, title)
}

/// Classifies a page against an arbitrary rule table
///
/// Returns `PageType::Other` when no rule matches.
pub fn classify_with(rules: &[ClassificationRule], url: &Url, title: &str) -> PageType {
    let segments: Vec<String> = url
        .path_segments()
        .map(|s| {
            s.filter(|seg| !seg.is_empty())
                .map(|seg| seg.to_ascii_lowercase())
                .collect()
        })
        .unwrap_or_default();
    let title = title.to_lowercase();

    rules
        .iter()
        .find(|rule| rule.matches(&segments, &title))
        .map(|rule| rule.label)
        .unwrap_or_default()
}

/// Returns true if `phrase` occurs in `text` on word boundaries
///
/// Both arguments are expected in lowercase.
fn contains_phrase(text: &str, phrase: &str) -> bool {
    text.match_indices(phrase).any(|(start, _)| {
        let end = start + phrase.len();
        let before_ok = text[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = text[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        before_ok && after_ok
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(path: &str, title: &str) -> PageType {
        let url = Url::parse(&format!("https://example.com{}", path)).unwrap();
        classify_page(&url, title)
    }

    #[test]
    fn test_root_is_home() {
        assert_eq!(classify("/", "Welcome"), PageType::Home);
        assert_eq!(classify("/index.html", ""), PageType::Home);
        assert_eq!(classify("/?ref=nav", ""), PageType::Home);
    }

    #[test]
    fn test_each_path_rule() {
        assert_eq!(classify("/about-us", ""), PageType::About);
        assert_eq!(classify("/company/team", ""), PageType::About);
        assert_eq!(classify("/services/consulting", ""), PageType::Services);
        assert_eq!(classify("/blog/2024/launch", ""), PageType::Blog);
        assert_eq!(classify("/contact", ""), PageType::Contact);
        assert_eq!(classify("/case-studies/acme", ""), PageType::CaseStudy);
        assert_eq!(classify("/resources/guides", ""), PageType::Resources);
        assert_eq!(classify("/privacy-policy", ""), PageType::Legal);
    }

    #[test]
    fn test_path_match_is_case_insensitive() {
        assert_eq!(classify("/About", ""), PageType::About);
        assert_eq!(classify("/BLOG/Post", ""), PageType::Blog);
    }

    #[test]
    fn test_title_rules_apply_when_path_is_silent() {
        assert_eq!(classify("/p/123", "Contact our sales team"), PageType::Contact);
        assert_eq!(classify("/p/124", "Acme: a case study"), PageType::CaseStudy);
        assert_eq!(classify("/p/125", "About Acme"), PageType::About);
    }

    #[test]
    fn test_path_rules_beat_title_rules() {
        assert_eq!(classify("/blog/contact-tips", "Contact tips"), PageType::Blog);
    }

    #[test]
    fn test_title_keywords_respect_word_boundaries() {
        assert_eq!(classify("/p/1", "Newsletter archive"), PageType::Other);
        assert_eq!(classify("/p/2", "Contactless payments"), PageType::Other);
    }

    #[test]
    fn test_default_is_other() {
        assert_eq!(classify("/random/page", "Something else"), PageType::Other);
        assert_eq!(classify("/xyz", ""), PageType::Other);
    }

    #[test]
    fn test_first_match_wins_in_custom_table() {
        let rules = [
            rule(RuleMatcher::PathSegment(&["x"]), PageType::Legal),
            rule(RuleMatcher::PathSegment(&["x"]), PageType::Blog),
        ];
        let url = Url::parse("https://example.com/x").unwrap();
        assert_eq!(classify_with(&rules, &url, ""), PageType::Legal);
        assert_eq!(classify_with(&[], &url, ""), PageType::Other);
    }
}
