use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to call the messages API: {0}")]
    ApiFetch(#[from] reqwest::Error),

    #[error("Failed to parse JSON: {0}")]
    ApiParse(#[from] serde_json::Error),

    // Specific HTTP status code errors
    #[error("API rate limit exceeded (429): {message} (URL: {url})")]
    ApiRateLimit { message: String, url: String },

    #[error("API overloaded (529): {message} (URL: {url})")]
    ApiOverloaded { message: String, url: String },

    #[error("API client error ({status}): {message} (URL: {url})")]
    ApiClientError {
        status: u16,
        message: String,
        url: String,
    },

    #[error("API server error ({status}): {message} (URL: {url})")]
    ApiServerError {
        status: u16,
        message: String,
        url: String,
    },

    // Network-specific errors
    #[error("Network timeout while calling: {url}")]
    NetworkTimeout { url: String },

    #[error("Connection failed to: {url} - {message}")]
    NetworkConnection { url: String, message: String },

    #[error("API stream error: {0}")]
    ApiStream(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing credential: environment variable {0} is not set")]
    MissingCredential(String),

    #[error("Permission denied for {path}: {message}")]
    Permission { path: String, message: String },

    #[error("Prompt template error: {0}")]
    PromptTemplate(String),

    #[error("Log setup error: {0}")]
    LogSetup(String),
}

impl AppError {
    /// Create a configuration error with context
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a log setup error with context
    pub fn log_setup_error(msg: impl Into<String>) -> Self {
        Self::LogSetup(msg.into())
    }

    /// Create a prompt template error with context
    pub fn prompt_template_error(msg: impl Into<String>) -> Self {
        Self::PromptTemplate(msg.into())
    }

    /// Create a missing credential error naming the environment variable
    pub fn missing_credential(var: impl Into<String>) -> Self {
        Self::MissingCredential(var.into())
    }

    /// Create a filesystem permission error
    pub fn permission(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Permission {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an API rate limit error
    pub fn api_rate_limit(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::ApiRateLimit {
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create an API overloaded error
    pub fn api_overloaded(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::ApiOverloaded {
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create an API client error (4xx status codes except 429)
    pub fn api_client_error(
        status: u16,
        message: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self::ApiClientError {
            status,
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create an API server error (5xx status codes except 529)
    pub fn api_server_error(
        status: u16,
        message: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self::ApiServerError {
            status,
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create a network timeout error
    pub fn network_timeout(url: impl Into<String>) -> Self {
        Self::NetworkTimeout { url: url.into() }
    }

    /// Create a network connection error
    pub fn network_connection(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NetworkConnection {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a stream decoding error
    pub fn api_stream(msg: impl Into<String>) -> Self {
        Self::ApiStream(msg.into())
    }

    /// Rate-limit rejections are the only failures the conversation driver retries.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, AppError::ApiRateLimit { .. })
    }

    /// Errors that abort the run before any sport is fetched.
    pub fn is_startup_fatal(&self) -> bool {
        matches!(
            self,
            AppError::MissingCredential(_)
                | AppError::Permission { .. }
                | AppError::Config(_)
                | AppError::PromptTemplate(_)
        )
    }
}
