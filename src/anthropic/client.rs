//! Messages API client over `reqwest`.

use super::driver::MessagesApi;
use super::http_client::create_http_client_with_timeout;
use super::models::{MessageResponse, MessagesRequest};
use super::stream::MessageAccumulator;
use crate::config::Config;
use crate::constants::api;
use crate::error::AppError;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use reqwest::{Client, Response};
use serde::Deserialize;
use std::future::Future;
use tracing::{debug, error, info, instrument};

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetails,
}

#[derive(Debug, Deserialize)]
struct ErrorDetails {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    message: String,
}

/// Streaming client for `POST /v1/messages`.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: Client,
    api_key: String,
    messages_url: String,
}

impl AnthropicClient {
    pub fn new(config: &Config, api_key: impl Into<String>) -> Result<Self, AppError> {
        let http = create_http_client_with_timeout(config.http_timeout_seconds)?;
        Ok(Self::with_client(http, &config.api_base_url, api_key))
    }

    pub fn with_client(http: Client, base_url: &str, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            messages_url: build_messages_url(base_url),
        }
    }

    pub fn messages_url(&self) -> &str {
        &self.messages_url
    }

    #[instrument(skip(self, request), fields(model = %request.model, turns = request.messages.len()))]
    async fn send(&self, request: &MessagesRequest) -> Result<MessageResponse, AppError> {
        let url = self.messages_url.as_str();
        debug!("Posting {} conversation entries to {url}", request.messages.len());

        let response = self
            .http
            .post(url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", api::API_VERSION)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!("Request failed for URL {}: {}", url, e);
                if e.is_timeout() {
                    AppError::network_timeout(url)
                } else if e.is_connect() {
                    AppError::network_connection(url, e.to_string())
                } else {
                    AppError::ApiFetch(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(response, url).await);
        }

        let is_event_stream = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|h| h.to_str().ok())
            .is_some_and(|ct| ct.starts_with("text/event-stream"));

        let message = if is_event_stream {
            read_event_stream(response, url).await?
        } else {
            // Some proxies answer a streaming request with a plain JSON body
            let body = response.text().await?;
            serde_json::from_str::<MessageResponse>(&body)?
        };

        info!(
            "Response {} finished with {:?} ({} input / {} output tokens)",
            message.id,
            message.stop_reason.as_ref().map(|r| r.as_str()),
            message.usage.input_tokens,
            message.usage.output_tokens
        );
        Ok(message)
    }
}

impl MessagesApi for AnthropicClient {
    fn create_message(
        &self,
        request: &MessagesRequest,
    ) -> impl Future<Output = Result<MessageResponse, AppError>> + Send {
        self.send(request)
    }
}

/// Joins the base URL and the messages path without doubling slashes.
pub fn build_messages_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), api::MESSAGES_PATH)
}

async fn read_event_stream(response: Response, url: &str) -> Result<MessageResponse, AppError> {
    let mut events = response.bytes_stream().eventsource();
    let mut accumulator = MessageAccumulator::new();

    while let Some(event) = events.next().await {
        let event = event.map_err(|e| AppError::api_stream(format!("SSE error: {e}")))?;
        accumulator.apply(&event.data, url)?;
        if accumulator.is_complete() {
            break;
        }
    }

    accumulator.finish()
}

/// Maps a non-success response to a specific error, using the API's error body when present.
async fn status_error(response: Response, url: &str) -> AppError {
    let status = response.status();
    let status_code = status.as_u16();
    let reason = status.canonical_reason().unwrap_or("Unknown error");
    let body = response.text().await.unwrap_or_default();

    let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) if !envelope.error.message.is_empty() => {
            format!("{}: {}", envelope.error.kind, envelope.error.message)
        }
        _ => reason.to_string(),
    };

    error!("HTTP {} - {} (URL: {})", status_code, message, url);

    match status_code {
        429 => AppError::api_rate_limit(message, url),
        529 => AppError::api_overloaded(message, url),
        400..=499 => AppError::api_client_error(status_code, message, url),
        _ => AppError::api_server_error(status_code, message, url),
    }
}
