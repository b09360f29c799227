//! HTML text extraction

use super::clean_text;
use encoding_rs::{Encoding, UTF_8};
use scraper::{ElementRef, Html, Selector};

/// Bytes scanned for a `<meta>` charset declaration
const META_SNIFF_LIMIT: usize = 1024;

/// Block elements inside these subtrees are skipped
const STRIPPED_TAGS: &[&str] = &["script", "style", "nav", "footer", "header", "aside"];

/// Elements whose text makes up the readable content
const BLOCK_TAGS: &str = "p, h1, h2, h3, h4, h5, h6, li";

/// Decodes an HTML body to a string
///
/// The charset comes from the `Content-Type` header, else from a `<meta>`
/// declaration near the top of the document, else UTF-8. A byte order mark
/// overrides all of them. Undecodable bytes become U+FFFD.
///
/// # Example
///
/// ```
/// use site_scribe::content::decode_html;
///
/// let body = b"<p>Caf\xe9</p>";
/// assert_eq!(decode_html(body, "text/html; charset=ISO-8859-1"), "<p>Café</p>");
/// ```
pub fn decode_html(body: &[u8], content_type: &str) -> String {
    let encoding = [charset_from_content_type(content_type), charset_from_meta(body)]
        .into_iter()
        .flatten()
        .find_map(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);

    let (text, _, _) = encoding.decode(body);
    text.into_owned()
}

fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(|c: char| c == '"' || c == '\'').to_string())
    })
}

/// Finds `charset=` in the head of the document
///
/// Matches both `<meta charset="...">` and the `http-equiv` form.
fn charset_from_meta(body: &[u8]) -> Option<String> {
    let head = &body[..body.len().min(META_SNIFF_LIMIT)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();

    let start = head.find("charset=")? + "charset=".len();
    let label: String = head[start..]
        .trim_start_matches(|c: char| c == '"' || c == '\'' || c == ' ')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
        .collect();

    (!label.is_empty()).then_some(label)
}

/// Extracts readable text from paragraphs, headings and list items
///
/// Blocks nested anywhere inside page chrome (`script`, `style`, `nav`,
/// `footer`, `header`, `aside`) are skipped. Each remaining match
/// contributes its full text followed by a newline; nested matches (a `p`
/// inside an `li`) contribute twice.
/// The result is passed through [`clean_text`].
///
/// # Example
///
/// ```
/// use site_scribe::content::extract_text_from_html;
///
/// let html = "<nav><p>Menu</p></nav><h2>Hours</h2><p>Open daily</p>";
/// assert_eq!(extract_text_from_html(html), "Hours Open daily");
/// ```
pub fn extract_text_from_html(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut text = String::new();
    if let Ok(blocks) = Selector::parse(BLOCK_TAGS) {
        for element in document.select(&blocks).filter(|e| !inside_chrome(e)) {
            text.extend(element.text());
            text.push('\n');
        }
    }

    clean_text(&text)
}

/// Returns true if any ancestor of `element` is one of the stripped tags
fn inside_chrome(element: &ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| STRIPPED_TAGS.contains(&ancestor.value().name()))
}

/// Whole-document fallback extraction
///
/// Every text node in the document is trimmed and the non-empty ones are
/// joined with single spaces before cleaning. Nothing is stripped here, so
/// this picks up text that lives outside block-level elements.
pub fn extract_text_alternative(html: &str) -> String {
    let document = Html::parse_document(html);

    let joined = document
        .root_element()
        .text()
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    clean_text(&joined)
}
