//! Page annotation
//!
//! An [`Annotator`] turns extracted page text into an [`Annotation`]:
//! bilingual keywords, bilingual two-sentence summaries and a product
//! number. Annotators never fail; anything that goes wrong inside one
//! yields [`Annotation::default`].

mod openai;

pub use openai::{AnnotationError, OpenAiAnnotator, OpenAiSettings};

use async_trait::async_trait;

/// Sentinel product number for "none found"
pub const NO_PRODUCT: &str = "no";

const KEYWORDS_EN: &str = "Keywords (EN):";
const KEYWORDS_FR: &str = "Keywords (FR):";
const SUMMARY_EN: &str = "Summary (EN):";
const SUMMARY_FR: &str = "Summary (FR):";
const PRODUCT_NUMBER: &str = "Product Number:";

/// Structured annotation for one page
///
/// Always fully populated: text fields default to empty strings and the
/// product number defaults to [`NO_PRODUCT`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub keywords_en: String,
    pub keywords_fr: String,
    pub summary_en: String,
    pub summary_fr: String,
    pub product_number: String,
}

impl Default for Annotation {
    fn default() -> Self {
        Self {
            keywords_en: String::new(),
            keywords_fr: String::new(),
            summary_en: String::new(),
            summary_fr: String::new(),
            product_number: NO_PRODUCT.to_string(),
        }
    }
}

impl Annotation {
    /// Parses a labelled model response
    ///
    /// Each line starting with one of `Keywords (EN):`, `Keywords (FR):`,
    /// `Summary (EN):`, `Summary (FR):` or `Product Number:` sets the matching
    /// field to the trimmed remainder of the line. Other lines are ignored,
    /// missing labels leave defaults, and a later line with the same label
    /// overwrites an earlier one. A product number of `no` (any case) or an
    /// empty one becomes [`NO_PRODUCT`].
    ///
    /// # Example
    ///
    /// ```
    /// use site_scribe::annotate::Annotation;
    ///
    /// let annotation = Annotation::parse("Keywords (EN): pumps, valves\nProduct Number: NO");
    /// assert_eq!(annotation.keywords_en, "pumps, valves");
    /// assert_eq!(annotation.product_number, "no");
    /// assert_eq!(annotation.summary_fr, "");
    /// ```
    pub fn parse(response: &str) -> Self {
        let mut annotation = Self::default();

        for line in response.trim().lines() {
            if let Some(value) = line.strip_prefix(KEYWORDS_EN) {
                annotation.keywords_en = value.trim().to_string();
            } else if let Some(value) = line.strip_prefix(KEYWORDS_FR) {
                annotation.keywords_fr = value.trim().to_string();
            } else if let Some(value) = line.strip_prefix(SUMMARY_EN) {
                annotation.summary_en = value.trim().to_string();
            } else if let Some(value) = line.strip_prefix(SUMMARY_FR) {
                annotation.summary_fr = value.trim().to_string();
            } else if let Some(value) = line.strip_prefix(PRODUCT_NUMBER) {
                let value = value.trim();
                annotation.product_number = if value.is_empty() || value.eq_ignore_ascii_case(NO_PRODUCT) {
                    NO_PRODUCT.to_string()
                } else {
                    value.to_string()
                };
            }
        }

        annotation
    }

    /// Returns the product number unless it is the "none" sentinel
    pub fn product(&self) -> Option<&str> {
        if self.product_number.eq_ignore_ascii_case(NO_PRODUCT) || self.product_number.is_empty() {
            None
        } else {
            Some(&self.product_number)
        }
    }
}

/// Capability that annotates extracted page text
///
/// Implementations must absorb their own failures and return
/// [`Annotation::default`] instead.
#[async_trait]
pub trait Annotator: Send + Sync {
    async fn annotate(&self, text: &str) -> Annotation;
}

/// Annotator that never calls out and always returns the default annotation
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAnnotator;

#[async_trait]
impl Annotator for NullAnnotator {
    async fn annotate(&self, _text: &str) -> Annotation {
        Annotation::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_response() {
        let response = "\
Keywords (EN): hydraulic pump, maintenance
Keywords (FR): pompe hydraulique, entretien
Summary (EN): This page describes a pump. It lists maintenance steps.
Summary (FR): Cette page décrit une pompe. Elle liste les étapes d'entretien.
Product Number: HP-2040";

        let annotation = Annotation::parse(response);
        assert_eq!(annotation.keywords_en, "hydraulic pump, maintenance");
        assert_eq!(annotation.keywords_fr, "pompe hydraulique, entretien");
        assert_eq!(
            annotation.summary_en,
            "This page describes a pump. It lists maintenance steps."
        );
        assert!(annotation.summary_fr.starts_with("Cette page"));
        assert_eq!(annotation.product_number, "HP-2040");
        assert_eq!(annotation.product(), Some("HP-2040"));
    }

    #[test]
    fn test_unknown_lines_ignored() {
        let response = "Sure! Here is the information:\n\nKeywords (EN): a, b\nNotes: nothing";
        let annotation = Annotation::parse(response);
        assert_eq!(annotation.keywords_en, "a, b");
        assert_eq!(annotation.keywords_fr, "");
        assert_eq!(annotation.product_number, NO_PRODUCT);
    }

    #[test]
    fn test_missing_labels_use_defaults() {
        assert_eq!(Annotation::parse(""), Annotation::default());
        assert_eq!(Annotation::parse("garbage\nmore garbage"), Annotation::default());
    }

    #[test]
    fn test_product_number_sentinel() {
        assert_eq!(Annotation::parse("Product Number: No").product_number, "no");
        assert_eq!(Annotation::parse("Product Number:   ").product_number, "no");
        assert_eq!(Annotation::parse("Product Number: no").product(), None);
    }

    #[test]
    fn test_labels_must_start_the_line() {
        let annotation = Annotation::parse("Result:\n  Keywords (EN): indented");
        assert_eq!(annotation.keywords_en, "");
    }

    #[test]
    fn test_default_annotation() {
        let annotation = Annotation::default();
        assert_eq!(annotation.product_number, "no");
        assert!(annotation.keywords_en.is_empty());
        assert!(annotation.summary_en.is_empty());
        assert_eq!(annotation.product(), None);
    }

    #[tokio::test]
    async fn test_null_annotator() {
        let annotation = NullAnnotator.annotate("some text").await;
        assert_eq!(annotation, Annotation::default());
    }
}
