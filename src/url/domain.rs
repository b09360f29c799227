use crate::url::normalize::authority_of;
use crate::{UrlError, UrlResult};
use url::Url;

/// Extracts the authority (lowercase host plus any non-default port) from a URL string
///
/// This is the value the crawl compares against its fixed starting domain.
///
/// # Arguments
///
/// * `url_str` - The absolute URL to inspect
///
/// # Returns
///
/// * `Ok(String)` - The authority, e.g. `example.com` or `127.0.0.1:8080`
/// * `Err(UrlError)` - The string is not an absolute http(s) URL with a host
///
/// # Examples
///
/// ```
/// use site_scribe::url::extract_authority;
///
/// assert_eq!(extract_authority("https://EXAMPLE.com/path").unwrap(), "example.com");
/// assert_eq!(extract_authority("http://localhost:8080/").unwrap(), "localhost:8080");
/// ```
pub fn extract_authority(url_str: &str) -> UrlResult<String> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if !url.has_host() {
        return Err(UrlError::MissingDomain);
    }

    Ok(authority_of(&url))
}
