use crate::config::Config;
use crate::constants::{
    MAX_TMP_RETENTION_HOURS, MIN_THINKING_BUDGET_TOKENS, REQUIRED_THINKING_TEMPERATURE,
};
use crate::error::AppError;
use std::path::Path;

/// Validates the configuration settings
///
/// # Arguments
/// * `config` - The configuration to validate
///
/// # Returns
/// * `Ok(())` - Configuration is valid
/// * `Err(AppError)` - Configuration validation failed
///
/// # Validation Rules
/// - Model identifier cannot be empty
/// - Thinking budget must be at least 1024 tokens and below `max_tokens`
/// - Temperature must be 1.0, since every request enables extended thinking
/// - At least one web search must be allowed
/// - Output directory cannot be empty
/// - HTML file name must be a bare file name
/// - API base URL must be an http(s) URL
/// - HTTP timeout must be at least one second
/// - Tmp retention must be at most [`MAX_TMP_RETENTION_HOURS`]
pub fn validate_config(config: &Config) -> Result<(), AppError> {
    if config.model.trim().is_empty() {
        return Err(AppError::config_error("Model identifier cannot be empty"));
    }

    if config.thinking_budget_tokens < MIN_THINKING_BUDGET_TOKENS {
        return Err(AppError::config_error(format!(
            "thinking_budget_tokens must be at least {MIN_THINKING_BUDGET_TOKENS}, got {}",
            config.thinking_budget_tokens
        )));
    }

    if config.max_tokens <= config.thinking_budget_tokens {
        return Err(AppError::config_error(format!(
            "max_tokens ({}) must be greater than thinking_budget_tokens ({})",
            config.max_tokens, config.thinking_budget_tokens
        )));
    }

    // The API rejects thinking requests at any other temperature
    if config.temperature != REQUIRED_THINKING_TEMPERATURE {
        return Err(AppError::config_error(format!(
            "temperature must be {REQUIRED_THINKING_TEMPERATURE} with extended thinking enabled, got {}",
            config.temperature
        )));
    }

    if config.web_search_max_uses == 0 {
        return Err(AppError::config_error(
            "web_search_max_uses must allow at least one search",
        ));
    }

    if config.output_dir.trim().is_empty() {
        return Err(AppError::config_error("Output directory cannot be empty"));
    }

    let html = Path::new(&config.html_filename);
    if config.html_filename.trim().is_empty()
        || html.file_name().map(|n| n != html.as_os_str()).unwrap_or(true)
    {
        return Err(AppError::config_error(format!(
            "html_filename must be a plain file name, got '{}'",
            config.html_filename
        )));
    }

    if !config.api_base_url.starts_with("http://") && !config.api_base_url.starts_with("https://")
    {
        return Err(AppError::config_error(format!(
            "api_base_url must start with http:// or https://, got '{}'",
            config.api_base_url
        )));
    }

    if config.http_timeout_seconds == 0 {
        return Err(AppError::config_error(
            "http_timeout_seconds must be at least 1",
        ));
    }

    if config.tmp_retention_hours > MAX_TMP_RETENTION_HOURS {
        return Err(AppError::config_error(format!(
            "tmp_retention_hours must be at most {MAX_TMP_RETENTION_HOURS}, got {}",
            config.tmp_retention_hours
        )));
    }

    if let Some(log_path) = &config.log_file_path
        && log_path.trim().is_empty()
    {
        return Err(AppError::config_error("Log file path cannot be empty"));
    }

    Ok(())
}
