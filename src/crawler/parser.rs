//! HTML link extraction
//!
//! Turns the anchors of a fetched page into the set of in-domain absolute
//! URLs the crawl may follow.

use crate::url::is_same_authority;
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use url::Url;

/// Hrefs with these prefixes are not navigable and are dropped
const SKIPPED_PREFIXES: &[&str] = &["#", "mailto:", "javascript:", "tel:", "data:"];

/// Extracts the in-domain links of an HTML page
///
/// # Link Rules
///
/// For every `<a href="...">`:
/// - Absolute `http://` / `https://` links are kept only when their
///   authority equals `base_authority`
/// - Protocol-relative `//host/path` links are treated as absolute with the
///   base URL's scheme
/// - Empty hrefs and `#`, `mailto:`, `javascript:`, `tel:`, `data:` hrefs are
///   dropped
/// - Anything else is relative: one leading `/` is removed and the rest is
///   appended to `<scheme>://<base_authority>/`, where the scheme is the base
///   URL's (`https` unless the site itself is served over `http`)
/// - A trailing `/` is removed
/// - Links containing any of `excluded` are dropped
///
/// The result is deduplicated. Markup that cannot be made sense of simply
/// yields fewer (or no) links.
///
/// # Arguments
///
/// * `base_authority` - Authority the crawl is confined to
/// * `html` - The decoded page body
/// * `base_url` - The page's final URL after redirects
/// * `excluded` - Forbidden substrings
///
/// # Example
///
/// ```
/// use site_scribe::crawler::extract_links;
///
/// let html = r##"<a href="#top">x</a><a href="/about">x</a><a href="https://other.com/x">x</a>"##;
/// let links = extract_links("example.com", html, "https://example.com/", &[]);
/// assert_eq!(links.into_iter().collect::<Vec<_>>(), vec!["https://example.com/about"]);
/// ```
pub fn extract_links(
    base_authority: &str,
    html: &str,
    base_url: &str,
    excluded: &[String],
) -> BTreeSet<String> {
    let scheme = base_scheme(base_url);

    collect_hrefs(html)
        .into_iter()
        .filter_map(|href| resolve_link(&href, base_authority, scheme))
        .map(strip_trailing_slash)
        .filter(|link| !excluded.iter().any(|pattern| link.contains(pattern.as_str())))
        .collect()
}

/// Returns the raw href of every anchor, duplicates removed
fn collect_hrefs(html: &str) -> BTreeSet<String> {
    let document = Html::parse_document(html);
    let mut hrefs = BTreeSet::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                hrefs.insert(href.to_string());
            }
        }
    }

    hrefs
}

/// Resolves one href to an absolute in-domain URL
///
/// Returns None if the link should be excluded.
fn resolve_link(href: &str, base_authority: &str, scheme: &str) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    if href.starts_with("http://") || href.starts_with("https://") {
        return is_same_authority(href, base_authority).then(|| href.to_string());
    }

    if let Some(rest) = href.strip_prefix("//") {
        let absolute = format!("{}://{}", scheme, rest);
        return is_same_authority(&absolute, base_authority).then_some(absolute);
    }

    if SKIPPED_PREFIXES.iter().any(|prefix| href.starts_with(prefix)) {
        return None;
    }

    let remainder = href.strip_prefix('/').unwrap_or(href);
    Some(format!("{}://{}/{}", scheme, base_authority, remainder))
}

fn base_scheme(base_url: &str) -> &'static str {
    match Url::parse(base_url) {
        Ok(url) if url.scheme() == "http" => "http",
        _ => "https",
    }
}

fn strip_trailing_slash(mut link: String) -> String {
    if link.ends_with('/') {
        link.pop();
    }
    link
}
