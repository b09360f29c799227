//! Annotated page files
//!
//! Each persisted page is a UTF-8 text file: a header with the final URL and
//! the annotation, a `------` delimiter, then the extracted text verbatim.

use crate::annotate::Annotation;
use crate::output::filename::{disambiguated_filename, sanitize_filename, PAGE_EXTENSION};
use crate::ScribeError;
use std::path::{Path, PathBuf};

/// Renders the header block for a page
///
/// The product line is `#pro : <value>` when a product number is known and
/// `#pro: no` otherwise.
pub fn render_header(final_url: &str, annotation: &Annotation) -> String {
    let mut header = String::new();

    header.push_str(&format!("lien: {}\n", final_url));
    header.push_str(&format!("mot clé anglais: {}\n", annotation.keywords_en));
    header.push_str(&format!("mot clé français: {}\n", annotation.keywords_fr));
    header.push_str(&format!("résumé (EN): {}\n", annotation.summary_en));
    header.push_str(&format!("résumé (FR): {}\n\n", annotation.summary_fr));

    match annotation.product() {
        Some(product) => header.push_str(&format!("#pro : {}\n", product)),
        None => header.push_str("#pro: no\n"),
    }

    header.push_str("\n------\n\n");
    header
}

/// Renders a complete page file
pub fn render_page(final_url: &str, annotation: &Annotation, text: &str) -> String {
    let mut page = render_header(final_url, annotation);
    page.push_str(text);
    page
}

/// Writes annotated pages into one domain's output directory
#[derive(Debug, Clone)]
pub struct PageWriter {
    dir: PathBuf,
    disambiguate: bool,
}

impl PageWriter {
    /// Creates a writer for `<output_directory>/<authority>`, creating it if needed
    ///
    /// # Returns
    ///
    /// * `Ok(PageWriter)` - The directory exists and is ready
    /// * `Err(ScribeError::Persistence)` - The directory could not be created
    pub fn create(output_directory: &Path, authority: &str, disambiguate: bool) -> Result<Self, ScribeError> {
        let dir = output_directory.join(authority);

        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|source| ScribeError::Persistence {
                path: dir.display().to_string(),
                source,
            })?;
            tracing::info!("Created output directory {}", dir.display());
        }

        Ok(Self { dir, disambiguate })
    }

    /// The domain output directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path the page for `final_url` is written to
    pub fn path_for(&self, final_url: &str) -> PathBuf {
        let stem = if self.disambiguate {
            disambiguated_filename(final_url)
        } else {
            sanitize_filename(final_url)
        };
        self.dir.join(format!("{}.{}", stem, PAGE_EXTENSION))
    }

    /// Writes one page, replacing any existing file of the same name
    ///
    /// # Arguments
    ///
    /// * `final_url` - URL after redirects; determines the filename
    /// * `annotation` - Header content
    /// * `text` - Extracted page text
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Path of the written file
    /// * `Err(ScribeError::Persistence)` - The file could not be written
    pub fn write_page(&self, final_url: &str, annotation: &Annotation, text: &str) -> Result<PathBuf, ScribeError> {
        let path = self.path_for(final_url);

        std::fs::write(&path, render_page(final_url, annotation, text)).map_err(|source| {
            ScribeError::Persistence {
                path: path.display().to_string(),
                source,
            }
        })?;

        Ok(path)
    }
}
