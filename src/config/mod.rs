//! Configuration module for Site-Scribe
//!
//! This module handles loading, parsing, and validating configuration files.
//! TOML is the default format; files ending in `.json` are read as JSON.
//! The annotation API key is never part of the configuration file.
//!
//! # Example
//!
//! ```no_run
//! use site_scribe::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Crawl will start at: {}", config.start_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::Config;

// Re-export parser functions
pub use parser::{load_config, parse_config, ConfigFormat};

/// Environment variable holding the annotation API key
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
