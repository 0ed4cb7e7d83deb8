//! Application-wide constants and configuration values
//!
//! This module centralizes all magic numbers and configuration constants
//! to improve maintainability and make the codebase more configurable.

use std::time::Duration;

/// Default model identifier used when the config file does not name one
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";

/// Default maximum number of output tokens per API call
pub const DEFAULT_MAX_TOKENS: u32 = 16_000;

/// Default sampling temperature (extended thinking requires 1.0)
pub const DEFAULT_TEMPERATURE: f32 = 1.0;

/// The only temperature the API accepts alongside extended thinking
pub const REQUIRED_THINKING_TEMPERATURE: f32 = 1.0;

/// Default extended thinking budget in tokens
pub const DEFAULT_THINKING_BUDGET_TOKENS: u32 = 10_000;

/// Smallest thinking budget the API accepts
pub const MIN_THINKING_BUDGET_TOKENS: u32 = 1_024;

/// Default number of web searches the model may run per request
pub const DEFAULT_WEB_SEARCH_MAX_USES: u32 = 10;

/// Default delay between two sports (and before HTML generation), in seconds
pub const DEFAULT_DELAY_BETWEEN_SPORTS_SECONDS: u64 = 30;

/// Default output directory name, relative to the base directory
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Default API base URL
pub const DEFAULT_API_BASE_URL: &str = "https://api.anthropic.com";

/// Default timeout for a single streamed API request in seconds.
/// Thinking plus several web searches routinely takes minutes.
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 600;

/// Maximum number of connections per host in the HTTP client pool
pub const HTTP_POOL_MAX_IDLE_PER_HOST: usize = 4;

/// Default prompt template file name, relative to the base directory
pub const DEFAULT_PROMPT_FILE: &str = "prompt-schedule-getter.txt";

/// Default generated page file name
pub const DEFAULT_HTML_FILENAME: &str = "index.html";

/// How long raw responses stay in the tmp directory
pub const DEFAULT_TMP_RETENTION_HOURS: u64 = 24;

/// Upper bound for the tmp retention setting (one year)
pub const MAX_TMP_RETENTION_HOURS: u64 = 24 * 365;

/// Base directory layout
pub mod layout {
    /// Directory holding `config.json` and `sports.json`
    pub const CONFIG_DIR: &str = "config";

    /// Configuration file name
    pub const CONFIG_FILE: &str = "config.json";

    /// Sports list file name
    pub const SPORTS_FILE: &str = "sports.json";

    /// Scratch directory for raw responses
    pub const TMP_DIR: &str = "tmp";

    /// Log directory
    pub const LOG_DIR: &str = "logs";

    /// Log file name prefix; the daily appender adds the date suffix
    pub const LOG_FILE_NAME: &str = "schedule_fetcher.log";
}

/// Environment variable names
pub mod env_vars {
    /// API credential (required for fetching)
    pub const API_KEY: &str = "ANTHROPIC_API_KEY";

    /// Output directory override, takes precedence over the config file
    pub const OUTPUT_DIR: &str = "HUSKERS_OUTPUT_DIR";

    /// API base URL override
    pub const API_BASE_URL: &str = "ANTHROPIC_BASE_URL";

    /// Log file path override
    pub const LOG_FILE: &str = "HUSKERS_LOG_FILE";
}

/// Anthropic Messages API protocol values
pub mod api {
    /// Messages endpoint path
    pub const MESSAGES_PATH: &str = "/v1/messages";

    /// Value of the `anthropic-version` header
    pub const API_VERSION: &str = "2023-06-01";

    /// Server-side web search tool type
    pub const WEB_SEARCH_TOOL_TYPE: &str = "web_search_20250305";

    /// Server-side web search tool name
    pub const WEB_SEARCH_TOOL_NAME: &str = "web_search";

    /// Follow-up user turn sent after the model paused for tool use
    pub const CONTINUATION_PROMPT: &str =
        "Please provide the complete schedules based on your search results.";
}

/// Conversation loop and retry configuration
pub mod retry {
    use super::Duration;

    /// Hard ceiling on conversation turns per sport
    pub const MAX_ITERATIONS: usize = 25;

    /// Total attempts per API call when rate limited (first try included)
    pub const MAX_RATE_LIMIT_ATTEMPTS: u32 = 5;

    /// First rate-limit backoff; doubles on every further retry
    pub const RATE_LIMIT_BASE_DELAY: Duration = Duration::from_secs(60);

    /// Pause before every conversation turn after the first
    pub const ITERATION_DELAY: Duration = Duration::from_secs(2);
}

/// Prompt template placeholder names
pub mod placeholders {
    /// Display name of the sport
    pub const SPORT_NAME: &str = "SPORT_NAME";

    /// CSV file name the model should emit
    pub const FILENAME: &str = "FILENAME";
}
