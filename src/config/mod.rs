use crate::constants::{self, env_vars};
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{info, warn};

pub mod paths;
pub mod sports;
pub mod validation;

pub use paths::BasePaths;
pub use sports::{SportSpec, default_sports, load_sports};
use validation::validate_config;

/// Configuration structure for the application.
/// Every key is optional in `config.json`; a missing key takes its built-in default.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Model identifier sent with every request.
    pub model: String,
    /// Maximum output tokens per request, thinking included.
    pub max_tokens: u32,
    /// Sampling temperature. Must stay 1.0 while extended thinking is on.
    pub temperature: f32,
    /// Extended thinking budget in tokens.
    pub thinking_budget_tokens: u32,
    /// How many web searches the model may run per request.
    pub web_search_max_uses: u32,
    /// Pause between sports and before HTML generation, in seconds.
    pub delay_between_sports_seconds: u64,
    /// Output directory for CSV files and the generated page, relative to the base directory.
    pub output_dir: String,
    /// Base URL of the messages API.
    pub api_base_url: String,
    /// HTTP timeout in seconds for one streamed request.
    pub http_timeout_seconds: u64,
    /// Prompt template file, relative to the base directory.
    pub prompt_file: String,
    /// File name of the generated page.
    pub html_filename: String,
    /// Path to the log file. If not specified, logs go to `<base>/logs/`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file_path: Option<String>,
    /// Raw responses older than this are removed from the tmp directory.
    pub tmp_retention_hours: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            model: constants::DEFAULT_MODEL.to_string(),
            max_tokens: constants::DEFAULT_MAX_TOKENS,
            temperature: constants::DEFAULT_TEMPERATURE,
            thinking_budget_tokens: constants::DEFAULT_THINKING_BUDGET_TOKENS,
            web_search_max_uses: constants::DEFAULT_WEB_SEARCH_MAX_USES,
            delay_between_sports_seconds: constants::DEFAULT_DELAY_BETWEEN_SPORTS_SECONDS,
            output_dir: constants::DEFAULT_OUTPUT_DIR.to_string(),
            api_base_url: constants::DEFAULT_API_BASE_URL.to_string(),
            http_timeout_seconds: constants::DEFAULT_HTTP_TIMEOUT_SECONDS,
            prompt_file: constants::DEFAULT_PROMPT_FILE.to_string(),
            html_filename: constants::DEFAULT_HTML_FILENAME.to_string(),
            log_file_path: None,
            tmp_retention_hours: constants::DEFAULT_TMP_RETENTION_HOURS,
        }
    }
}

impl Config {
    /// Loads configuration from `<base>/config/config.json`.
    /// Environment variables can override config file values.
    ///
    /// # Environment Variables
    /// - `HUSKERS_OUTPUT_DIR` - Override output directory
    /// - `ANTHROPIC_BASE_URL` - Override API base URL
    /// - `HUSKERS_LOG_FILE` - Override log file path
    ///
    /// # Returns
    /// * `Ok(Config)` - Successfully loaded (or defaulted) configuration
    /// * `Err(AppError)` - Config file unreadable, malformed, or invalid
    ///
    /// # Notes
    /// - A missing config file is not an error; defaults are used
    /// - Environment variables take precedence over config file
    pub async fn load(paths: &BasePaths) -> Result<Self, AppError> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            let config = Self::load_from_path(&config_path).await?;
            info!("Loaded configuration from {}", config_path.display());
            config
        } else {
            warn!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            Config::default()
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads configuration from a specific file without applying environment overrides.
    pub async fn load_from_path(path: &Path) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).await?;
        Self::from_json(&content)
    }

    /// Parses configuration JSON; absent keys take their defaults.
    pub fn from_json(content: &str) -> Result<Self, AppError> {
        serde_json::from_str(content).map_err(|e| {
            AppError::config_error(format!("Malformed config.json: {e}"))
        })
    }

    /// Applies environment overrides. Empty values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Some(output_dir) = non_empty_env(env_vars::OUTPUT_DIR) {
            info!("Output directory overridden by {}", env_vars::OUTPUT_DIR);
            self.output_dir = output_dir;
        }

        if let Some(base_url) = non_empty_env(env_vars::API_BASE_URL) {
            self.api_base_url = base_url;
        }

        if let Some(log_file) = non_empty_env(env_vars::LOG_FILE) {
            self.log_file_path = Some(log_file);
        }
    }

    /// Validates the configuration settings
    pub fn validate(&self) -> Result<(), AppError> {
        validate_config(self)
    }

    /// Reads the API credential. Its absence is fatal for a fetch run.
    pub fn api_key_from_env() -> Result<String, AppError> {
        non_empty_env(env_vars::API_KEY).ok_or_else(|| AppError::missing_credential(env_vars::API_KEY))
    }

    /// Absolute output directory for this run.
    pub fn output_dir_path(&self, paths: &BasePaths) -> PathBuf {
        paths.resolve(&self.output_dir)
    }

    /// Absolute prompt template path for this run.
    pub fn prompt_file_path(&self, paths: &BasePaths) -> PathBuf {
        paths.resolve(&self.prompt_file)
    }

    pub fn delay_between_sports(&self) -> Duration {
        Duration::from_secs(self.delay_between_sports_seconds)
    }

    pub fn tmp_retention(&self) -> Duration {
        Duration::from_secs(self.tmp_retention_hours.saturating_mul(60 * 60))
    }

    /// Displays current configuration settings to stdout.
    ///
    /// # Notes
    /// - Shows config file location and effective settings
    /// - The API key is never printed, only whether it is set
    pub fn display(&self, paths: &BasePaths) {
        let config_path = paths.config_file();
        let api_key_state = match Self::api_key_from_env() {
            Ok(key) => mask_secret(&key),
            Err(_) => "(not set)".to_string(),
        };

        println!("\nCurrent Configuration");
        println!("────────────────────────────────────");
        println!("Config Location:");
        if config_path.exists() {
            println!("{}", config_path.display());
        } else {
            println!("{} (not found, defaults in use)", config_path.display());
        }
        println!("────────────────────────────────────");
        println!("Model:              {}", self.model);
        println!("Max Tokens:         {}", self.max_tokens);
        println!("Temperature:        {}", self.temperature);
        println!("Thinking Budget:    {}", self.thinking_budget_tokens);
        println!("Web Search Uses:    {}", self.web_search_max_uses);
        println!("Delay Between:      {} seconds", self.delay_between_sports_seconds);
        println!("HTTP Timeout:       {} seconds", self.http_timeout_seconds);
        println!("API Base URL:       {}", self.api_base_url);
        println!("API Key:            {api_key_state}");
        println!("────────────────────────────────────");
        println!("Output Directory:");
        println!("{}", self.output_dir_path(paths).display());
        println!("Prompt Template:");
        println!("{}", self.prompt_file_path(paths).display());
        println!("Log File Location:");
        match &self.log_file_path {
            Some(custom_path) => println!("{custom_path}"),
            None => {
                println!(
                    "{}/{}",
                    paths.log_dir().display(),
                    constants::layout::LOG_FILE_NAME
                );
                println!("(Default location)");
            }
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Keeps only the last four characters of a secret.
fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}
