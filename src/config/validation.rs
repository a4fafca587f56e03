use crate::config::types::{Config, CrawlerConfig, HttpConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Largest accepted page limit
pub const MAX_PAGE_LIMIT: u32 = 50;

/// Largest accepted retry bound
pub const MAX_RETRIES: u32 = 10;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_http_config(&config.http)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if let Some(limit) = config.page_limit {
        if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(ConfigError::Validation(format!(
                "page-limit must be between 1 and {}, got {}",
                MAX_PAGE_LIMIT, limit
            )));
        }
    }

    if config.genre_limit == Some(0) {
        return Err(ConfigError::Validation(
            "genre-limit must be >= 1".to_string(),
        ));
    }

    if config.max_retries > MAX_RETRIES {
        return Err(ConfigError::Validation(format!(
            "max-retries must be between 0 and {}, got {}",
            MAX_RETRIES, config.max_retries
        )));
    }

    if let Some(genres) = &config.genres {
        if genres.is_empty() || genres.iter().any(|g| g.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "genres must be a non-empty list of non-empty names".to_string(),
            ));
        }
    }

    if config.assets_dir.is_empty() {
        return Err(ConfigError::Validation(
            "assets-dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs == 0 || config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeouts must be at least one second".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}
