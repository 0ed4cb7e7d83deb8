//! Folding a streamed (SSE) Messages API reply into one [`MessageResponse`].
//!
//! Each content block is rebuilt as raw JSON: text, thinking and signature
//! deltas are appended to the block that `content_block_start` opened, tool
//! input arrives as partial JSON and is parsed at `content_block_stop`.

use super::models::{ContentBlock, MessageResponse, StopReason, Usage};
use crate::error::AppError;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, trace};

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamEvent {
    MessageStart {
        message: MessageStartPayload,
    },
    ContentBlockStart {
        index: usize,
        content_block: Value,
    },
    ContentBlockDelta {
        index: usize,
        delta: BlockDelta,
    },
    ContentBlockStop {
        index: usize,
    },
    MessageDelta {
        delta: MessageDeltaPayload,
        #[serde(default)]
        usage: Option<Usage>,
    },
    MessageStop,
    Ping,
    Error {
        error: StreamErrorPayload,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
struct MessageStartPayload {
    id: String,
    #[serde(default)]
    model: String,
    #[serde(default)]
    usage: Usage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum BlockDelta {
    TextDelta { text: String },
    ThinkingDelta { thinking: String },
    SignatureDelta { signature: String },
    InputJsonDelta { partial_json: String },
    CitationsDelta { citation: Value },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
struct MessageDeltaPayload {
    #[serde(default)]
    stop_reason: Option<StopReason>,
}

#[derive(Debug, Deserialize)]
struct StreamErrorPayload {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    message: String,
}

/// Accumulates SSE events until `message_stop`.
#[derive(Debug, Default)]
pub struct MessageAccumulator {
    id: Option<String>,
    model: String,
    blocks: Vec<Map<String, Value>>,
    partial_json: Vec<String>,
    stop_reason: Option<StopReason>,
    usage: Usage,
    complete: bool,
}

impl MessageAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Applies one SSE event. `url` only labels errors.
    pub fn apply(&mut self, data: &str, url: &str) -> Result<(), AppError> {
        let event: StreamEvent = serde_json::from_str(data)
            .map_err(|e| AppError::api_stream(format!("Unparseable stream event: {e}")))?;
        trace!("Stream event: {event:?}");

        match event {
            StreamEvent::MessageStart { message } => {
                self.id = Some(message.id);
                self.model = message.model;
                self.usage = message.usage;
            }
            StreamEvent::ContentBlockStart {
                index,
                content_block,
            } => {
                let Value::Object(block) = content_block else {
                    return Err(AppError::api_stream(format!(
                        "content_block_start at index {index} is not an object"
                    )));
                };
                self.ensure_slot(index);
                self.blocks[index] = block;
            }
            StreamEvent::ContentBlockDelta { index, delta } => {
                self.ensure_slot(index);
                self.apply_delta(index, delta);
            }
            StreamEvent::ContentBlockStop { index } => {
                self.finish_block(index)?;
            }
            StreamEvent::MessageDelta { delta, usage } => {
                if delta.stop_reason.is_some() {
                    self.stop_reason = delta.stop_reason;
                }
                if let Some(usage) = usage {
                    self.usage.output_tokens = usage.output_tokens;
                    if usage.input_tokens > 0 {
                        self.usage.input_tokens = usage.input_tokens;
                    }
                    if usage.server_tool_use.is_some() {
                        self.usage.server_tool_use = usage.server_tool_use;
                    }
                }
            }
            StreamEvent::MessageStop => {
                self.complete = true;
            }
            StreamEvent::Ping => {}
            StreamEvent::Error { error } => {
                return Err(match error.kind.as_str() {
                    "rate_limit_error" => AppError::api_rate_limit(error.message, url),
                    "overloaded_error" => AppError::api_overloaded(error.message, url),
                    _ => AppError::api_stream(format!("{}: {}", error.kind, error.message)),
                });
            }
            StreamEvent::Unknown => {
                debug!("Ignoring unknown stream event");
            }
        }

        Ok(())
    }

    fn ensure_slot(&mut self, index: usize) {
        if self.blocks.len() <= index {
            self.blocks.resize_with(index + 1, Map::new);
            self.partial_json.resize_with(index + 1, String::new);
        }
    }

    fn apply_delta(&mut self, index: usize, delta: BlockDelta) {
        let block = &mut self.blocks[index];
        match delta {
            BlockDelta::TextDelta { text } => append_str(block, "text", &text),
            BlockDelta::ThinkingDelta { thinking } => append_str(block, "thinking", &thinking),
            BlockDelta::SignatureDelta { signature } => {
                block.insert("signature".to_string(), Value::String(signature));
            }
            BlockDelta::InputJsonDelta { partial_json } => {
                self.partial_json[index].push_str(&partial_json);
            }
            BlockDelta::CitationsDelta { citation } => {
                let citations = block
                    .entry("citations")
                    .or_insert_with(|| Value::Array(Vec::new()));
                if !citations.is_array() {
                    *citations = Value::Array(Vec::new());
                }
                if let Value::Array(list) = citations {
                    list.push(citation);
                }
            }
            BlockDelta::Unknown => debug!("Ignoring unknown delta type at index {index}"),
        }
    }

    fn finish_block(&mut self, index: usize) -> Result<(), AppError> {
        let Some(json) = self.partial_json.get_mut(index) else {
            return Ok(());
        };
        if json.is_empty() {
            return Ok(());
        }
        let input: Value = serde_json::from_str(json).map_err(|e| {
            AppError::api_stream(format!("Tool input at index {index} is not valid JSON: {e}"))
        })?;
        json.clear();
        self.blocks[index].insert("input".to_string(), input);
        Ok(())
    }

    /// Produces the assembled reply. Fails when the stream ended before `message_stop`.
    pub fn finish(self) -> Result<MessageResponse, AppError> {
        if !self.complete {
            return Err(AppError::api_stream(
                "stream closed before the message completed",
            ));
        }
        let id = self
            .id
            .ok_or_else(|| AppError::api_stream("stream carried no message_start event"))?;

        Ok(MessageResponse {
            id,
            model: self.model,
            content: self
                .blocks
                .into_iter()
                .filter(|block| !block.is_empty())
                .map(|block| ContentBlock::from_value(Value::Object(block)))
                .collect(),
            stop_reason: self.stop_reason,
            usage: self.usage,
        })
    }
}

fn append_str(block: &mut Map<String, Value>, key: &str, fragment: &str) {
    match block.get_mut(key) {
        Some(Value::String(existing)) => existing.push_str(fragment),
        _ => {
            block.insert(key.to_string(), Value::String(fragment.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const URL: &str = "https://api.example.com/v1/messages";

    fn feed(acc: &mut MessageAccumulator, events: &[Value]) {
        for event in events {
            acc.apply(&event.to_string(), URL).unwrap();
        }
    }

    #[test]
    fn test_text_message_assembles() {
        let mut acc = MessageAccumulator::new();
        feed(
            &mut acc,
            &[
                json!({"type": "message_start", "message": {"id": "msg_1", "model": "m",
                       "content": [], "usage": {"input_tokens": 12, "output_tokens": 1}}}),
                json!({"type": "content_block_start", "index": 0,
                       "content_block": {"type": "text", "text": ""}}),
                json!({"type": "ping"}),
                json!({"type": "content_block_delta", "index": 0,
                       "delta": {"type": "text_delta", "text": "```csv:Football.csv\n"}}),
                json!({"type": "content_block_delta", "index": 0,
                       "delta": {"type": "text_delta", "text": "Date,Day\n```"}}),
                json!({"type": "content_block_stop", "index": 0}),
                json!({"type": "message_delta", "delta": {"stop_reason": "end_turn"},
                       "usage": {"output_tokens": 40}}),
                json!({"type": "message_stop"}),
            ],
        );

        assert!(acc.is_complete());
        let response = acc.finish().unwrap();
        assert_eq!(response.id, "msg_1");
        assert_eq!(response.stop_reason, Some(StopReason::EndTurn));
        assert_eq!(response.text(), "```csv:Football.csv\nDate,Day\n```");
        assert_eq!(response.usage.input_tokens, 12);
        assert_eq!(response.usage.output_tokens, 40);
    }

    #[test]
    fn test_thinking_and_tool_use_blocks_rebuilt() {
        let mut acc = MessageAccumulator::new();
        feed(
            &mut acc,
            &[
                json!({"type": "message_start", "message": {"id": "msg_2"}}),
                json!({"type": "content_block_start", "index": 0,
                       "content_block": {"type": "thinking", "thinking": ""}}),
                json!({"type": "content_block_delta", "index": 0,
                       "delta": {"type": "thinking_delta", "thinking": "I should "}}),
                json!({"type": "content_block_delta", "index": 0,
                       "delta": {"type": "thinking_delta", "thinking": "search."}}),
                json!({"type": "content_block_delta", "index": 0,
                       "delta": {"type": "signature_delta", "signature": "EqQB"}}),
                json!({"type": "content_block_stop", "index": 0}),
                json!({"type": "content_block_start", "index": 1,
                       "content_block": {"type": "server_tool_use", "id": "srvtoolu_1",
                                         "name": "web_search", "input": {}}}),
                json!({"type": "content_block_delta", "index": 1,
                       "delta": {"type": "input_json_delta", "partial_json": "{\"query\": \"hus"}}),
                json!({"type": "content_block_delta", "index": 1,
                       "delta": {"type": "input_json_delta", "partial_json": "kers\"}"}}),
                json!({"type": "content_block_stop", "index": 1}),
                json!({"type": "message_delta", "delta": {"stop_reason": "tool_use"}}),
                json!({"type": "message_stop"}),
            ],
        );

        let response = acc.finish().unwrap();
        assert_eq!(response.stop_reason, Some(StopReason::ToolUse));
        assert_eq!(response.content.len(), 2);
        assert_eq!(
            response.content[0].as_value(),
            &json!({"type": "thinking", "thinking": "I should search.", "signature": "EqQB"})
        );
        assert_eq!(
            response.content[1].as_value()["input"],
            json!({"query": "huskers"})
        );
        assert_eq!(response.tool_use_count(), 1);
    }

    #[test]
    fn test_citations_delta_collected() {
        let mut acc = MessageAccumulator::new();
        feed(
            &mut acc,
            &[
                json!({"type": "message_start", "message": {"id": "msg_3"}}),
                json!({"type": "content_block_start", "index": 0,
                       "content_block": {"type": "text", "text": ""}}),
                json!({"type": "content_block_delta", "index": 0,
                       "delta": {"type": "citations_delta",
                                 "citation": {"type": "web_search_result_location", "url": "https://huskers.com"}}}),
                json!({"type": "content_block_delta", "index": 0,
                       "delta": {"type": "text_delta", "text": "Opens vs. Cincinnati"}}),
                json!({"type": "message_delta", "delta": {"stop_reason": "end_turn"}}),
                json!({"type": "message_stop"}),
            ],
        );

        let response = acc.finish().unwrap();
        let block = response.content[0].as_value();
        assert_eq!(block["citations"].as_array().unwrap().len(), 1);
        assert_eq!(response.text(), "Opens vs. Cincinnati");
    }

    #[test]
    fn test_error_events_are_classified() {
        let mut acc = MessageAccumulator::new();
        let rate_limited = acc.apply(
            &json!({"type": "error", "error": {"type": "rate_limit_error", "message": "slow down"}})
                .to_string(),
            URL,
        );
        assert!(matches!(rate_limited, Err(AppError::ApiRateLimit { .. })));

        let overloaded = acc.apply(
            &json!({"type": "error", "error": {"type": "overloaded_error", "message": "busy"}})
                .to_string(),
            URL,
        );
        assert!(matches!(overloaded, Err(AppError::ApiOverloaded { .. })));

        let other = acc.apply(
            &json!({"type": "error", "error": {"type": "api_error", "message": "boom"}}).to_string(),
            URL,
        );
        assert!(matches!(other, Err(AppError::ApiStream(_))));
    }

    #[test]
    fn test_truncated_stream_is_an_error() {
        let mut acc = MessageAccumulator::new();
        feed(
            &mut acc,
            &[json!({"type": "message_start", "message": {"id": "msg_4"}})],
        );
        assert!(!acc.is_complete());
        assert!(matches!(acc.finish(), Err(AppError::ApiStream(_))));
    }

    #[test]
    fn test_unknown_events_are_ignored() {
        let mut acc = MessageAccumulator::new();
        feed(
            &mut acc,
            &[
                json!({"type": "message_start", "message": {"id": "msg_5"}}),
                json!({"type": "some_future_event", "payload": 1}),
                json!({"type": "message_delta", "delta": {"stop_reason": "max_tokens"}}),
                json!({"type": "message_stop"}),
            ],
        );
        let response = acc.finish().unwrap();
        assert_eq!(response.stop_reason, Some(StopReason::MaxTokens));
        assert!(response.content.is_empty());
    }

    #[test]
    fn test_garbage_event_is_an_error() {
        let mut acc = MessageAccumulator::new();
        assert!(acc.apply("not json at all", URL).is_err());
    }
}
