mod common;

use common::{football_answer, search_blocks, sse_body, text_block};
use huskers_schedule::anthropic::driver::MessagesApi;
use huskers_schedule::anthropic::{
    AnthropicClient, CompletionStatus, ConversationDriver, DriverSettings, Message,
    MessageParams, StopReason,
};
use huskers_schedule::config::Config;
use huskers_schedule::error::AppError;
use huskers_schedule::extract_files;
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sse_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/event-stream")
}

fn client_for(server: &MockServer) -> AnthropicClient {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap();
    AnthropicClient::with_client(http, &server.uri(), "sk-ant-test")
}

fn fast_settings() -> DriverSettings {
    DriverSettings {
        rate_limit_base_delay: Duration::from_millis(5),
        iteration_delay: Duration::ZERO,
        ..DriverSettings::default()
    }
}

fn params() -> MessageParams {
    MessageParams::from_config(&Config::default())
}

#[tokio::test]
async fn test_streamed_reply_is_assembled() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "sk-ant-test"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "stream": true,
            "thinking": {"type": "enabled", "budget_tokens": 10000},
            "tools": [{"type": "web_search_20250305", "name": "web_search", "max_uses": 10}]
        })))
        .respond_with(sse_response(sse_body(
            "msg_01",
            &[text_block(&football_answer())],
            "end_turn",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let request = params().request(&[Message::user("Find the Football schedule")]);
    let response = client.create_message(&request).await.unwrap();

    assert_eq!(response.id, "msg_01");
    assert_eq!(response.stop_reason, Some(StopReason::EndTurn));
    assert_eq!(response.usage.output_tokens, 120);

    let files = extract_files(&response.text());
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].filename, "Football.csv");
}

#[tokio::test]
async fn test_plain_json_reply_is_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg_json",
            "type": "message",
            "role": "assistant",
            "model": "claude-test",
            "content": [{"type": "text", "text": "No schedule published yet."}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let request = params().request(&[Message::user("hi")]);
    let response = client.create_message(&request).await.unwrap();

    assert_eq!(response.id, "msg_json");
    assert_eq!(response.text(), "No schedule published yet.");
}

#[tokio::test]
async fn test_http_status_mapping() {
    let cases = [
        (429, "rate_limit_error"),
        (529, "overloaded_error"),
        (400, "invalid_request_error"),
        (500, "api_error"),
    ];

    for (status, kind) in cases {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "type": "error",
                "error": {"type": kind, "message": "nope"}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let request = params().request(&[Message::user("hi")]);
        let error = client.create_message(&request).await.unwrap_err();

        match status {
            429 => assert!(error.is_rate_limit(), "{error}"),
            529 => assert!(matches!(error, AppError::ApiOverloaded { .. }), "{error}"),
            400 => assert!(
                matches!(error, AppError::ApiClientError { status: 400, .. }),
                "{error}"
            ),
            _ => assert!(
                matches!(error, AppError::ApiServerError { status: 500, .. }),
                "{error}"
            ),
        }
        assert!(error.to_string().contains("nope"));
    }
}

#[tokio::test]
async fn test_stream_error_event_maps_to_rate_limit() {
    let server = MockServer::start().await;
    let body = "event: message_start\ndata: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_x\",\"model\":\"m\",\"usage\":{}}}\n\n\
                event: error\ndata: {\"type\":\"error\",\"error\":{\"type\":\"rate_limit_error\",\"message\":\"slow down\"}}\n\n";
    Mock::given(method("POST"))
        .respond_with(sse_response(body.to_string()))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let error = client
        .create_message(&params().request(&[Message::user("hi")]))
        .await
        .unwrap_err();
    assert!(error.is_rate_limit());
}

#[tokio::test]
async fn test_truncated_stream_is_an_error() {
    let server = MockServer::start().await;
    let mut body = sse_body("msg_cut", &[text_block("partial")], "end_turn");
    let cut = body.find("event: message_stop").unwrap();
    body.truncate(cut);
    Mock::given(method("POST"))
        .respond_with(sse_response(body))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let error = client
        .create_message(&params().request(&[Message::user("hi")]))
        .await
        .unwrap_err();
    assert!(matches!(error, AppError::ApiStream(_)), "{error}");
}

#[tokio::test]
async fn test_driver_continues_after_tool_use() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(sse_response(sse_body("msg_1", &search_blocks(), "tool_use")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(sse_response(sse_body(
            "msg_2",
            &[text_block(&football_answer())],
            "end_turn",
        )))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let driver = ConversationDriver::with_settings(client_for(&server), params(), fast_settings());
    let outcome = driver.run("Find the Football schedule").await.unwrap();

    assert_eq!(outcome.status, CompletionStatus::Final);
    assert_eq!(outcome.iterations, 2);
    assert_eq!(outcome.conversation.len(), 3);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);

    let second: Value = serde_json::from_slice(&requests[1].body).unwrap();
    let messages = second["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[1]["role"], "assistant");
    // The assistant turn is replayed with its tool blocks intact
    assert_eq!(messages[1]["content"][1]["type"], "server_tool_use");
    assert_eq!(messages[1]["content"][1]["input"]["query"], "Nebraska football schedule");
    assert_eq!(messages[2]["role"], "user");
    assert_eq!(
        messages[2]["content"],
        "Please provide the complete schedules based on your search results."
    );

    let text = outcome.assistant_text();
    assert!(text.starts_with("Let me search for the schedule."));
    assert_eq!(extract_files(&text).len(), 1);
}

#[tokio::test]
async fn test_driver_retries_http_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "type": "error",
            "error": {"type": "rate_limit_error", "message": "slow down"}
        })))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(sse_response(sse_body(
            "msg_ok",
            &[text_block("done")],
            "end_turn",
        )))
        .mount(&server)
        .await;

    let driver = ConversationDriver::with_settings(client_for(&server), params(), fast_settings());
    let outcome = driver.run("prompt").await.unwrap();

    assert_eq!(outcome.response.id, "msg_ok");
    assert_eq!(outcome.iterations, 1);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_driver_gives_up_after_five_rate_limits() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let driver = ConversationDriver::with_settings(client_for(&server), params(), fast_settings());
    let error = driver.run("prompt").await.unwrap_err();

    assert!(error.is_rate_limit());
    assert_eq!(server.received_requests().await.unwrap().len(), 5);
}

#[tokio::test]
async fn test_driver_does_not_retry_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let driver = ConversationDriver::with_settings(client_for(&server), params(), fast_settings());
    let error = driver.run("prompt").await.unwrap_err();

    assert!(matches!(error, AppError::ApiServerError { status: 500, .. }));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}
