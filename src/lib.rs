//! Site-Scribe: a single-domain text harvester
//!
//! This crate crawls one web domain from a seed URL, extracts readable text
//! from every HTML page and PDF it reaches, annotates the text through an
//! external summarization model, and writes one annotated text file per page.

pub mod annotate;
pub mod config;
pub mod content;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Site-Scribe operations
///
/// Only these errors end a crawl. Everything that goes wrong with a single
/// page is a [`PageError`] and is absorbed by the crawl loop.
#[derive(Debug, Error)]
pub enum ScribeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Failed to write {path}: {source}")]
    Persistence {
        path: String,
        source: std::io::Error,
    },
}

/// Errors local to one page of the crawl
///
/// The crawl loop logs these and moves on to the next frontier entry.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("Fetch failed for {url}: {source}")]
    Fetch {
        url: String,
        source: crawler::FetchError,
    },

    #[error("Page not found: {url}")]
    NotFound { url: String },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Unsupported content type '{content_type}' for {url}")]
    UnsupportedContentType { url: String, content_type: String },

    #[error("No extractable text at {url}")]
    EmptyContent { url: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Site-Scribe operations
pub type Result<T> = std::result::Result<T, ScribeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use annotate::{Annotation, Annotator};
pub use config::Config;
pub use state::PageOutcome;
pub use url::{extract_authority, normalize_url};
