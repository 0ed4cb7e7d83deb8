//! Shared helpers for building streamed Messages API replies.

#![allow(dead_code)]

use serde_json::{Value, json};

/// One server-sent event frame.
fn frame(event: &Value) -> String {
    let name = event["type"].as_str().unwrap_or("unknown");
    format!("event: {name}\ndata: {event}\n\n")
}

/// Builds a complete SSE body for a reply made of the given content blocks.
///
/// Text blocks are streamed as a start event plus one `text_delta`; every
/// other block is sent whole in its `content_block_start`.
pub fn sse_body(id: &str, blocks: &[Value], stop_reason: &str) -> String {
    let mut body = frame(&json!({
        "type": "message_start",
        "message": {
            "id": id,
            "type": "message",
            "role": "assistant",
            "model": "claude-test",
            "content": [],
            "stop_reason": null,
            "usage": {"input_tokens": 25, "output_tokens": 1}
        }
    }));
    body.push_str(&frame(&json!({"type": "ping"})));

    for (index, block) in blocks.iter().enumerate() {
        if block["type"] == "text" {
            body.push_str(&frame(&json!({
                "type": "content_block_start",
                "index": index,
                "content_block": {"type": "text", "text": ""}
            })));
            body.push_str(&frame(&json!({
                "type": "content_block_delta",
                "index": index,
                "delta": {"type": "text_delta", "text": block["text"]}
            })));
        } else {
            body.push_str(&frame(&json!({
                "type": "content_block_start",
                "index": index,
                "content_block": block
            })));
        }
        body.push_str(&frame(&json!({"type": "content_block_stop", "index": index})));
    }

    body.push_str(&frame(&json!({
        "type": "message_delta",
        "delta": {"stop_reason": stop_reason, "stop_sequence": null},
        "usage": {"output_tokens": 120}
    })));
    body.push_str(&frame(&json!({"type": "message_stop"})));
    body
}

pub fn text_block(text: &str) -> Value {
    json!({"type": "text", "text": text})
}

pub fn search_blocks() -> Vec<Value> {
    vec![
        text_block("Let me search for the schedule."),
        json!({
            "type": "server_tool_use",
            "id": "srvtoolu_01",
            "name": "web_search",
            "input": {"query": "Nebraska football schedule"}
        }),
        json!({
            "type": "web_search_tool_result",
            "tool_use_id": "srvtoolu_01",
            "content": []
        }),
    ]
}

pub const FOOTBALL_CSV: &str = "Date,Day,Opponent,Location,Venue,Time,Event,Watch,Result\n\
8/28,Thu,Cincinnati,Neutral,Arrowhead Stadium,8:00 PM,Kansas City Classic,ESPN,W 20-17\n\
9/6,Sat,Akron,Home,Memorial Stadium,7:00 PM,,FS1,\n";

pub fn football_answer() -> String {
    format!("Here is the schedule.\n\n```csv:Football.csv\n{FOOTBALL_CSV}```\n")
}
