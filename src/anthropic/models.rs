//! Messages API wire types.
//!
//! Content blocks are kept as raw JSON. The assistant turn is replayed to the
//! API verbatim on tool-use continuation, and thinking signatures, server tool
//! results and citations must survive that round trip untouched.

use crate::config::Config;
use crate::constants::api;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A message role in the Messages API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One content block, stored exactly as the API produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentBlock(Value);

impl ContentBlock {
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn text_block(text: impl Into<String>) -> Self {
        Self(serde_json::json!({ "type": "text", "text": text.into() }))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// The block's `type` field (`text`, `thinking`, `server_tool_use`, ...).
    pub fn kind(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    /// Text of a `text` block; `None` for every other block type.
    pub fn text(&self) -> Option<&str> {
        match self.kind() {
            Some("text") => self.0.get("text").and_then(Value::as_str),
            _ => None,
        }
    }

    /// Client-side or server-side tool invocation.
    pub fn is_tool_use(&self) -> bool {
        matches!(self.kind(), Some("tool_use") | Some("server_tool_use"))
    }
}

/// Either a string shorthand or a full content block list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

/// One role-tagged entry of the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: MessageContent,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn assistant(blocks: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Blocks(blocks),
        }
    }

    /// Concatenated text of the message's text blocks.
    pub fn text(&self) -> String {
        match &self.content {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Blocks(blocks) => collect_text(blocks),
        }
    }
}

fn collect_text(blocks: &[ContentBlock]) -> String {
    blocks.iter().filter_map(ContentBlock::text).collect()
}

/// Why the model stopped generating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    StopSequence,
    ToolUse,
    PauseTurn,
    Refusal,
    Other(String),
}

impl From<String> for StopReason {
    fn from(value: String) -> Self {
        match value.as_str() {
            "end_turn" => StopReason::EndTurn,
            "max_tokens" => StopReason::MaxTokens,
            "stop_sequence" => StopReason::StopSequence,
            "tool_use" => StopReason::ToolUse,
            "pause_turn" => StopReason::PauseTurn,
            "refusal" => StopReason::Refusal,
            _ => StopReason::Other(value),
        }
    }
}

impl From<StopReason> for String {
    fn from(value: StopReason) -> Self {
        value.as_str().to_string()
    }
}

impl StopReason {
    pub fn as_str(&self) -> &str {
        match self {
            StopReason::EndTurn => "end_turn",
            StopReason::MaxTokens => "max_tokens",
            StopReason::StopSequence => "stop_sequence",
            StopReason::ToolUse => "tool_use",
            StopReason::PauseTurn => "pause_turn",
            StopReason::Refusal => "refusal",
            StopReason::Other(reason) => reason,
        }
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerToolUsage {
    #[serde(default)]
    pub web_search_requests: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_tool_use: Option<ServerToolUsage>,
}

/// A complete assistant reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub id: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<StopReason>,
    #[serde(default)]
    pub usage: Usage,
}

impl MessageResponse {
    /// Concatenated text of all text blocks.
    pub fn text(&self) -> String {
        collect_text(&self.content)
    }

    pub fn tool_use_count(&self) -> usize {
        self.content.iter().filter(|b| b.is_tool_use()).count()
    }

    /// The reply as an assistant conversation entry, content untouched.
    pub fn to_assistant_message(&self) -> Message {
        Message::assistant(self.content.clone())
    }
}

/// Extended thinking configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThinkingConfig {
    #[serde(rename = "type")]
    pub kind: String,
    pub budget_tokens: u32,
}

impl ThinkingConfig {
    pub fn enabled(budget_tokens: u32) -> Self {
        Self {
            kind: "enabled".to_string(),
            budget_tokens,
        }
    }
}

/// Server tool declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_uses: Option<u32>,
}

impl ToolSpec {
    pub fn web_search(max_uses: u32) -> Self {
        Self {
            kind: api::WEB_SEARCH_TOOL_TYPE.to_string(),
            name: api::WEB_SEARCH_TOOL_NAME.to_string(),
            max_uses: Some(max_uses),
        }
    }
}

/// Request body for `POST /v1/messages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub thinking: ThinkingConfig,
    pub tools: Vec<ToolSpec>,
    pub messages: Vec<Message>,
    pub stream: bool,
}

/// Per-run model parameters; turned into a request for every conversation turn.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageParams {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub thinking_budget_tokens: u32,
    pub web_search_max_uses: u32,
}

impl MessageParams {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            thinking_budget_tokens: config.thinking_budget_tokens,
            web_search_max_uses: config.web_search_max_uses,
        }
    }

    /// Builds a streaming request carrying the whole conversation so far.
    pub fn request(&self, messages: &[Message]) -> MessagesRequest {
        MessagesRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            thinking: ThinkingConfig::enabled(self.thinking_budget_tokens),
            tools: vec![ToolSpec::web_search(self.web_search_max_uses)],
            messages: messages.to_vec(),
            stream: true,
        }
    }
}
