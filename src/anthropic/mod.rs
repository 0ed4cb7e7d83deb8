pub mod client;
pub mod driver;
pub mod http_client;
pub mod models;
pub mod stream;

pub use client::AnthropicClient;
pub use driver::{
    CompletionStatus, ConversationDriver, ConversationOutcome, DriverSettings, MessagesApi,
};
pub use models::{Message, MessageParams, MessageResponse, MessagesRequest, StopReason};
