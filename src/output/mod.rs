//! Output module for persisted pages and crawl reports
//!
//! This module handles:
//! - Deriving filesystem-safe names from page URLs
//! - Writing annotated page files
//! - Recording and printing crawl statistics

mod filename;
pub mod stats;
mod writer;

pub use filename::{disambiguated_filename, sanitize_filename, PAGE_EXTENSION};
pub use stats::{print_statistics, CrawlStatistics};
pub use writer::{render_header, render_page, PageWriter};
