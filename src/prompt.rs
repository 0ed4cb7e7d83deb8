//! Prompt templating
//!
//! Prompt templates are plain text with `{{PLACEHOLDER}}` tokens. Each token
//! is replaced verbatim; no escaping or conditional logic is applied.

use crate::config::SportSpec;
use crate::constants::placeholders;
use crate::error::AppError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{([A-Z0-9_]+)\}\}").expect("placeholder pattern is a valid regex")
});

/// Replaces every `{{KEY}}` with its value.
///
/// Placeholders without a supplied value are left in place and reported.
pub fn render_template(template: &str, values: &[(&str, &str)]) -> String {
    let rendered = PLACEHOLDER_RE.replace_all(template, |caps: &regex::Captures<'_>| {
        let key = &caps[1];
        match values.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => (*value).to_string(),
            None => caps[0].to_string(),
        }
    });

    for leftover in unresolved_placeholders(&rendered) {
        warn!("Prompt placeholder {{{{{leftover}}}}} has no value");
    }

    rendered.into_owned()
}

/// Names of placeholders still present in `text`.
pub fn unresolved_placeholders(text: &str) -> Vec<String> {
    PLACEHOLDER_RE
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Renders the prompt for one sport.
pub fn prompt_for_sport(template: &str, sport: &SportSpec) -> String {
    debug!("Rendering prompt for {}", sport.name);
    render_template(
        template,
        &[
            (placeholders::SPORT_NAME, sport.name.as_str()),
            (placeholders::FILENAME, sport.filename.as_str()),
        ],
    )
}

/// Reads the prompt template file.
pub async fn load_template(path: &Path) -> Result<String, AppError> {
    if !path.exists() {
        return Err(AppError::prompt_template_error(format!(
            "Prompt file not found: {}",
            path.display()
        )));
    }

    let template = fs::read_to_string(path).await?;
    if template.trim().is_empty() {
        return Err(AppError::prompt_template_error(format!(
            "Prompt file is empty: {}",
            path.display()
        )));
    }
    Ok(template)
}
