//! Nebraska Cornhuskers Schedule Fetcher Library
//!
//! Fetches each configured sport's schedule through the Anthropic Messages
//! API (extended thinking plus server-side web search), saves the CSV files
//! found in the reply, and renders them into one static HTML page.
//!
//! # Examples
//!
//! ```rust,no_run
//! use huskers_schedule::anthropic::{AnthropicClient, ConversationDriver, MessageParams};
//! use huskers_schedule::config::{Config, SportSpec};
//! use huskers_schedule::error::AppError;
//! use huskers_schedule::extract::extract_files;
//! use huskers_schedule::prompt::prompt_for_sport;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), AppError> {
//!     let config = Config::default();
//!     let client = AnthropicClient::new(&config, Config::api_key_from_env()?)?;
//!     let driver = ConversationDriver::new(client, MessageParams::from_config(&config));
//!
//!     let sport = SportSpec::new("Football", "Football.csv");
//!     let prompt = prompt_for_sport("Find the {{SPORT_NAME}} schedule as {{FILENAME}}", &sport);
//!     let outcome = driver.run(&prompt).await?;
//!
//!     for file in extract_files(&outcome.assistant_text()) {
//!         println!("{}: {} bytes", file.filename, file.content.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod anthropic;
pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod extract;
pub mod logging;
pub mod prompt;
pub mod render;
pub mod storage;

// Re-export commonly used types for convenience
pub use config::{Config, SportSpec};
pub use error::AppError;
pub use extract::{ExtractedFile, extract_files};
pub use render::{GameRow, render_document};
pub use storage::OutputStore;

/// Current version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
