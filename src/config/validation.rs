use crate::config::types::Config;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_start_url(&config.start_url)?;
    validate_crawl_limits(config)?;
    validate_annotation_settings(config)?;
    Ok(())
}

/// The seed must be an absolute http(s) URL with a host
fn validate_start_url(start_url: &str) -> Result<(), ConfigError> {
    let url = Url::parse(start_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid start_url '{}': {}", start_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "start_url '{}' must use http or https",
            start_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "start_url '{}' has no host",
            start_url
        )));
    }

    Ok(())
}

fn validate_crawl_limits(config: &Config) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.output_directory.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output_directory cannot be empty".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if !config.delay_between_requests.is_finite() || config.delay_between_requests < 0.0 {
        return Err(ConfigError::Validation(format!(
            "delay_between_requests must be a non-negative number of seconds, got {}",
            config.delay_between_requests
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.excluded_link_patterns.iter().any(|p| p.is_empty()) {
        return Err(ConfigError::Validation(
            "excluded_link_patterns cannot contain empty patterns".to_string(),
        ));
    }

    Ok(())
}

fn validate_annotation_settings(config: &Config) -> Result<(), ConfigError> {
    if config.openai_model.trim().is_empty() {
        return Err(ConfigError::Validation(
            "openai_model cannot be empty".to_string(),
        ));
    }

    if config.openai_max_tokens < 1 {
        return Err(ConfigError::Validation(format!(
            "openai_max_tokens must be >= 1, got {}",
            config.openai_max_tokens
        )));
    }

    if !(0.0..=2.0).contains(&config.openai_temperature) {
        return Err(ConfigError::Validation(format!(
            "openai_temperature must be between 0.0 and 2.0, got {}",
            config.openai_temperature
        )));
    }

    Url::parse(&config.openai_base_url).map_err(|e| {
        ConfigError::InvalidUrl(format!(
            "Invalid openai_base_url '{}': {}",
            config.openai_base_url, e
        ))
    })?;

    Ok(())
}
