use serde::Deserialize;

/// Main configuration structure for Site-Scribe
///
/// Field names match the keys accepted in both the TOML and JSON formats.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Seed URL; its authority becomes the only domain the crawl may visit
    pub start_url: String,

    /// Maximum number of pages to persist
    pub max_pages: u32,

    /// Root directory for output; pages land in `<output_directory>/<authority>/`
    pub output_directory: String,

    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Pause after each persisted page (seconds)
    #[serde(default = "default_delay")]
    pub delay_between_requests: f64,

    /// Chat model used for annotation
    pub openai_model: String,

    #[serde(default = "default_max_tokens")]
    pub openai_max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub openai_temperature: f32,

    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    /// Timeout for a single annotation request (seconds)
    #[serde(default = "default_openai_timeout")]
    pub openai_timeout_secs: u64,

    /// Extra attempts after a retryable annotation failure
    #[serde(default = "default_openai_retries")]
    pub openai_max_retries: u32,

    /// Timeout for a single page fetch (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Links containing any of these substrings are never queued
    #[serde(default = "default_excluded_link_patterns")]
    pub excluded_link_patterns: Vec<String>,

    /// Append-only log file; `None` or an empty string logs to stderr only
    #[serde(default = "default_log_file")]
    pub log_file: Option<String>,

    /// Append a short URL hash to filenames so distinct URLs never collide
    #[serde(default)]
    pub disambiguate_filenames: bool,
}

impl Config {
    /// Delay between persisted pages as a `Duration`
    pub fn delay(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(self.delay_between_requests.max(0.0))
    }

    /// Log file path, if file logging is enabled
    pub fn log_path(&self) -> Option<&str> {
        self.log_file.as_deref().filter(|p| !p.trim().is_empty())
    }
}

fn default_delay() -> f64 {
    1.0
}

fn default_max_tokens() -> u32 {
    300
}

fn default_temperature() -> f32 {
    0.5
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_timeout() -> u64 {
    60
}

fn default_openai_retries() -> u32 {
    2
}

fn default_request_timeout() -> u64 {
    30
}

fn default_excluded_link_patterns() -> Vec<String> {
    vec!["postulez-en-ligne".to_string()]
}

fn default_log_file() -> Option<String> {
    Some("crawler_log.txt".to_string())
}
