//! Content classification and text extraction
//!
//! A fetched response is routed by its declared content type (and, for
//! PDFs, its URL suffix) to HTML or PDF text extraction. Both paths finish
//! with [`clean_text`], so the text handed to annotation and persistence is
//! always a single whitespace-collapsed line.

mod html;
mod pdf;

pub use html::{decode_html, extract_text_alternative, extract_text_from_html};
pub use pdf::extract_text_from_pdf;

#[cfg(test)]
pub(crate) use pdf::sample_pdf;

/// Which extraction path a response takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// PDF document
    Pdf,
    /// HTML page
    Html,
    /// Anything else; the page is skipped
    Unsupported,
}

impl ContentKind {
    /// Classifies a response
    ///
    /// # Decision Order
    ///
    /// 1. Content type contains `application/pdf`, or the final URL ends in
    ///    `.pdf` (case-insensitive) → `Pdf`
    /// 2. Content type contains `text/html` → `Html`
    /// 3. Otherwise → `Unsupported`
    ///
    /// # Examples
    ///
    /// ```
    /// use site_scribe::content::ContentKind;
    ///
    /// assert_eq!(ContentKind::classify("text/html; charset=utf-8", "https://e.com/"), ContentKind::Html);
    /// assert_eq!(ContentKind::classify("application/octet-stream", "https://e.com/doc.PDF"), ContentKind::Pdf);
    /// assert_eq!(ContentKind::classify("image/png", "https://e.com/logo.png"), ContentKind::Unsupported);
    /// ```
    pub fn classify(content_type: &str, final_url: &str) -> Self {
        let content_type = content_type.to_lowercase();

        if content_type.contains("application/pdf") || final_url.to_lowercase().ends_with(".pdf") {
            ContentKind::Pdf
        } else if content_type.contains("text/html") {
            ContentKind::Html
        } else {
            ContentKind::Unsupported
        }
    }
}

/// Result of running a response through classification and extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Non-empty cleaned text, and the path that produced it
    Text { kind: ContentKind, text: String },
    /// The extraction path ran but produced no text
    Empty { kind: ContentKind },
    /// Content type not handled
    Unsupported,
}

/// Classifies a response and extracts its text
///
/// HTML is first run through block-level extraction; if that yields nothing
/// the whole-document fallback is tried. PDF text comes from
/// [`extract_text_from_pdf`].
///
/// # Arguments
///
/// * `content_type` - The response's `Content-Type` header (may be empty)
/// * `final_url` - URL after redirects
/// * `body` - Raw response body
pub fn classify_and_extract(content_type: &str, final_url: &str, body: &[u8]) -> Extraction {
    let kind = ContentKind::classify(content_type, final_url);

    let text = match kind {
        ContentKind::Pdf => extract_text_from_pdf(body),
        ContentKind::Html => {
            let html = decode_html(body, content_type);
            let primary = extract_text_from_html(&html);
            if primary.is_empty() {
                tracing::debug!("Primary HTML extraction empty for {}, using fallback", final_url);
                extract_text_alternative(&html)
            } else {
                primary
            }
        }
        ContentKind::Unsupported => return Extraction::Unsupported,
    };

    if text.is_empty() {
        Extraction::Empty { kind }
    } else {
        Extraction::Text { kind, text }
    }
}

/// Collapses every run of whitespace to one space and trims the ends
///
/// # Examples
///
/// ```
/// use site_scribe::content::clean_text;
///
/// assert_eq!(clean_text("  a\n\n b\t c  "), "a b c");
/// ```
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
