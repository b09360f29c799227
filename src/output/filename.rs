//! Filesystem-safe names derived from page URLs

use sha2::{Digest, Sha256};

/// Extension of every persisted page
pub const PAGE_EXTENSION: &str = "txt";

/// Characters kept besides ASCII letters and digits
const ALLOWED_PUNCTUATION: &str = "-_.() ";

/// Longest stem kept before a hash suffix is added; keeps names under the
/// common 255-byte filesystem limit
const MAX_STEM_BYTES: usize = 200;

/// Derives the file stem for a page from its final URL
///
/// # Derivation Steps
///
/// 1. Drop everything up to and including `://`
/// 2. Percent-decode
/// 3. Replace `/` with `_`
/// 4. Keep only ASCII letters, digits and `-_.() `
/// 5. Strip trailing periods
///
/// An empty result becomes `index`. A stem longer than 200 bytes is cut to
/// 200 bytes and suffixed with a short hash of the URL. The mapping is
/// deterministic but not injective; two URLs can share a stem.
///
/// # Examples
///
/// ```
/// use site_scribe::output::sanitize_filename;
///
/// assert_eq!(sanitize_filename("https://example.com/a%20b.html"), "example.com_a b.html");
/// assert_eq!(sanitize_filename("https://example.com/docs/"), "example.com_docs_");
/// ```
pub fn sanitize_filename(final_url: &str) -> String {
    let without_scheme = match final_url.find("://") {
        Some(idx) => &final_url[idx + 3..],
        None => final_url,
    };

    let decoded = urlencoding::decode_binary(without_scheme.as_bytes());
    let decoded = String::from_utf8_lossy(&decoded);

    let stem: String = decoded
        .replace('/', "_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || ALLOWED_PUNCTUATION.contains(*c))
        .collect();

    let stem = stem.trim_end_matches('.');
    if stem.is_empty() {
        return "index".to_string();
    }

    if stem.len() > MAX_STEM_BYTES {
        let mut cut = MAX_STEM_BYTES;
        while !stem.is_char_boundary(cut) {
            cut -= 1;
        }
        return format!("{}-{}", stem[..cut].trim_end_matches('.'), url_hash(final_url));
    }

    stem.to_string()
}

/// Like [`sanitize_filename`] with a short hash of the full URL appended
///
/// Distinct URLs that sanitize to the same stem get distinct names.
pub fn disambiguated_filename(final_url: &str) -> String {
    format!("{}-{}", sanitize_filename(final_url), url_hash(final_url))
}

/// First 8 hex digits of the URL's SHA-256
fn url_hash(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    hex::encode(digest)[..8].to_string()
}
