use url::Url;

/// Normalizes a URL into the crawl's dedup key
///
/// # Normalization Steps
///
/// 1. Parse the URL (scheme and host are lowercased by the parser, default
///    ports and dot segments are dropped)
/// 2. Keep only scheme, authority and path; query and fragment are not part
///    of the key
/// 3. Remove trailing slashes from the path, so `https://example.com/` and
///    `https://example.com` share one key
///
/// Strings that do not parse as absolute URLs fall back to a textual
/// version of the same rule: cut at the first `?` or `#`, then strip
/// trailing slashes.
///
/// The function is idempotent: `normalize_url(&normalize_url(u)) == normalize_url(u)`.
///
/// # Examples
///
/// ```
/// use site_scribe::url::normalize_url;
///
/// assert_eq!(normalize_url("HTTPS://Example.COM/page/"), "https://example.com/page");
/// assert_eq!(normalize_url("https://example.com/page?x=1#top"), "https://example.com/page");
/// ```
pub fn normalize_url(url_str: &str) -> String {
    let trimmed = url_str.trim();

    match Url::parse(trimmed) {
        Ok(url) if url.has_host() => {
            let mut key = format!("{}://{}{}", url.scheme(), authority_of(&url), url.path());
            strip_trailing_slashes(&mut key);
            key
        }
        _ => {
            let end = trimmed
                .find(|c: char| c == '?' || c == '#')
                .unwrap_or(trimmed.len());
            let mut key = trimmed[..end].to_string();
            strip_trailing_slashes(&mut key);
            key
        }
    }
}

/// Host plus explicit (non-default) port
pub(crate) fn authority_of(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    }
}

fn strip_trailing_slashes(key: &mut String) {
    let len = key.trim_end_matches('/').len();
    key.truncate(len);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_trailing_slash() {
        assert_eq!(
            normalize_url("https://example.com/page/"),
            "https://example.com/page"
        );
    }

    #[test]
    fn test_root_collapses_with_bare_authority() {
        assert_eq!(normalize_url("https://example.com/"), "https://example.com");
        assert_eq!(normalize_url("https://example.com"), "https://example.com");
    }

    #[test]
    fn test_remove_fragment() {
        assert_eq!(
            normalize_url("https://example.com/page#section"),
            "https://example.com/page"
        );
    }

    #[test]
    fn test_query_not_part_of_key() {
        assert_eq!(
            normalize_url("https://example.com/list?page=2"),
            normalize_url("https://example.com/list")
        );
    }

    #[test]
    fn test_case_insensitive_scheme_and_host() {
        assert_eq!(
            normalize_url("HTTPS://EXAMPLE.COM/Page"),
            "https://example.com/Page"
        );
    }

    #[test]
    fn test_keeps_explicit_port() {
        assert_eq!(
            normalize_url("http://127.0.0.1:8080/docs/"),
            "http://127.0.0.1:8080/docs"
        );
    }

    #[test]
    fn test_drops_default_port() {
        assert_eq!(
            normalize_url("https://example.com:443/a"),
            "https://example.com/a"
        );
    }

    #[test]
    fn test_dot_segments_resolved() {
        assert_eq!(
            normalize_url("https://example.com/a/../b/./c"),
            "https://example.com/b/c"
        );
    }

    #[test]
    fn test_repeated_trailing_slashes() {
        assert_eq!(normalize_url("https://example.com/a//"), "https://example.com/a");
    }

    #[test]
    fn test_unparseable_falls_back_to_text() {
        assert_eq!(normalize_url("not a url/?q=1"), "not a url");
        assert_eq!(normalize_url("/relative/path/#frag"), "/relative/path");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "https://example.com/",
            "https://example.com/a/b/",
            "HTTP://Example.com:80/x?y=1#z",
            "https://example.com/a//",
            "https://example.com/caf%C3%A9/",
            "https://example.com/a b.html",
            "http://127.0.0.1:9000",
            "not a url/",
            "",
        ];

        for sample in samples {
            let once = normalize_url(sample);
            assert_eq!(normalize_url(&once), once, "not idempotent for {:?}", sample);
        }
    }
}
