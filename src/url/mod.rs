//! URL handling module for Site-Scribe
//!
//! This module provides the crawl's dedup key (`normalize_url`) and the
//! authority extraction used for domain containment (`extract_authority`).

mod domain;
mod normalize;

// Re-export main functions
pub use domain::extract_authority;
pub use normalize::normalize_url;
pub(crate) use normalize::authority_of;

/// Returns true if `url_str` is an http(s) URL whose authority equals `authority`
///
/// Unparseable URLs are never in-domain.
///
/// # Examples
///
/// ```
/// use site_scribe::url::is_same_authority;
///
/// assert!(is_same_authority("https://example.com/a", "example.com"));
/// assert!(!is_same_authority("https://other.com/a", "example.com"));
/// assert!(!is_same_authority("/a", "example.com"));
/// ```
pub fn is_same_authority(url_str: &str, authority: &str) -> bool {
    extract_authority(url_str)
        .map(|a| a.eq_ignore_ascii_case(authority))
        .unwrap_or(false)
}
