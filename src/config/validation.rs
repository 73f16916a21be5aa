use crate::config::types::{
    Config, FirstPassConfig, InputConfig, OutputConfig, RateLimitKind, SecondPassConfig,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Upper bound for the first-pass worker pool
const MAX_CONCURRENT_FETCHES: u32 = 1024;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_first_pass(&config.first_pass)?;
    validate_second_pass(&config.second_pass)?;
    validate_input(&config.input)?;
    validate_output(&config.output)?;
    Ok(())
}

/// Validates first-pass configuration
fn validate_first_pass(config: &FirstPassConfig) -> Result<(), ConfigError> {
    validate_selector(&config.selector)?;
    validate_attribute(&config.attribute)?;

    if let Some(limit) = config.max_concurrent_fetches {
        if limit < 1 || limit > MAX_CONCURRENT_FETCHES {
            return Err(ConfigError::Validation(format!(
                "max_concurrent_fetches must be between 1 and {}, got {}",
                MAX_CONCURRENT_FETCHES, limit
            )));
        }
    }

    Ok(())
}

/// Validates second-pass configuration
fn validate_second_pass(config: &SecondPassConfig) -> Result<(), ConfigError> {
    validate_base_domain(&config.base_domain)?;
    validate_selector(&config.selector)?;
    validate_attribute(&config.attribute)?;

    if config.rate_limit != RateLimitKind::None && config.delay_ms == 0 {
        return Err(ConfigError::Validation(
            "delay_ms must be > 0 unless rate-limit is \"none\"".to_string(),
        ));
    }

    Ok(())
}

/// Validates the base domain that hrefs are appended to
fn validate_base_domain(base_domain: &str) -> Result<(), ConfigError> {
    let url = Url::parse(base_domain)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_domain: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_domain '{}' must use http or https",
            base_domain
        )));
    }

    // Hrefs start with '/', so a trailing slash would double it
    if base_domain.ends_with('/') {
        return Err(ConfigError::Validation(format!(
            "base_domain '{}' must not end with '/'",
            base_domain
        )));
    }

    Ok(())
}

/// Validates that a CSS selector compiles
fn validate_selector(selector: &str) -> Result<(), ConfigError> {
    if selector.trim().is_empty() {
        return Err(ConfigError::InvalidSelector(
            "selector cannot be empty".to_string(),
        ));
    }

    Selector::parse(selector)
        .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e)))?;

    Ok(())
}

fn validate_attribute(attribute: &str) -> Result<(), ConfigError> {
    if attribute.trim().is_empty() {
        return Err(ConfigError::Validation(
            "attribute cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_input(config: &InputConfig) -> Result<(), ConfigError> {
    if config.path.is_empty() {
        return Err(ConfigError::Validation(
            "input path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_output(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.path.is_empty() {
        return Err(ConfigError::Validation(
            "output path cannot be empty".to_string(),
        ));
    }
    Ok(())
}
