//! Conversation loop for one sport's fetch.
//!
//! A fetch is a short conversation: the prompt goes out as a single user turn,
//! and whenever the model stops to use a tool the assistant turn plus a fixed
//! follow-up are appended and the call is repeated. The loop is bounded twice:
//! by [`DriverSettings::max_iterations`] conversation turns and, inside each
//! turn, by [`DriverSettings::max_rate_limit_attempts`] calls when rate limited.

use super::models::{Message, MessageParams, MessageResponse, MessagesRequest, StopReason};
use crate::constants::{api, retry};
use crate::error::AppError;
use std::future::Future;
use std::time::Duration;
use tracing::{error, info, warn};

/// The seam between the conversation loop and the network.
pub trait MessagesApi {
    fn create_message(
        &self,
        request: &MessagesRequest,
    ) -> impl Future<Output = Result<MessageResponse, AppError>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverSettings {
    pub max_iterations: usize,
    pub max_rate_limit_attempts: u32,
    pub rate_limit_base_delay: Duration,
    pub iteration_delay: Duration,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            max_iterations: retry::MAX_ITERATIONS,
            max_rate_limit_attempts: retry::MAX_RATE_LIMIT_ATTEMPTS,
            rate_limit_base_delay: retry::RATE_LIMIT_BASE_DELAY,
            iteration_delay: retry::ITERATION_DELAY,
        }
    }
}

/// Backoff before retry number `retry` (0-based): base, 2×base, 4×base, ...
pub fn rate_limit_delay(base: Duration, retry: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(retry))
}

/// How the conversation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionStatus {
    /// The model finished its answer.
    Final,
    /// The answer was cut off at `max_tokens`; it is used as-is.
    Truncated,
    /// Any stop reason other than completion, truncation or tool use.
    UnexpectedStop(String),
    /// Every iteration ended in tool use; the last reply is returned.
    IterationLimit,
}

/// Result of one driven conversation.
#[derive(Debug, Clone)]
pub struct ConversationOutcome {
    /// The reply that ended the loop.
    pub response: MessageResponse,
    /// Earlier replies that ended in tool use, in order.
    pub intermediate: Vec<MessageResponse>,
    /// Conversation state: the prompt plus two entries per tool-use continuation.
    pub conversation: Vec<Message>,
    pub iterations: usize,
    pub status: CompletionStatus,
}

impl ConversationOutcome {
    /// Text of every assistant reply in order, one reply per line group.
    pub fn assistant_text(&self) -> String {
        self.intermediate
            .iter()
            .chain(std::iter::once(&self.response))
            .map(MessageResponse::text)
            .filter(|text| !text.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Drives one conversation against a [`MessagesApi`].
pub struct ConversationDriver<A> {
    api: A,
    params: MessageParams,
    settings: DriverSettings,
}

impl<A: MessagesApi> ConversationDriver<A> {
    pub fn new(api: A, params: MessageParams) -> Self {
        Self::with_settings(api, params, DriverSettings::default())
    }

    pub fn with_settings(api: A, params: MessageParams, settings: DriverSettings) -> Self {
        Self {
            api,
            params,
            settings,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn settings(&self) -> &DriverSettings {
        &self.settings
    }

    /// Runs the conversation for a fully substituted prompt.
    ///
    /// # Returns
    /// * `Ok(ConversationOutcome)` - a terminal reply, or the last reply when the
    ///   iteration ceiling was reached
    /// * `Err(AppError)` - a non-rate-limit failure, or rate limiting that outlasted
    ///   every retry
    pub async fn run(&self, prompt: &str) -> Result<ConversationOutcome, AppError> {
        let max_iterations = self.settings.max_iterations;
        if max_iterations == 0 {
            return Err(AppError::config_error("max_iterations must be at least 1"));
        }

        let mut conversation = vec![Message::user(prompt)];
        let mut intermediate = Vec::new();

        for iteration in 1..=max_iterations {
            if iteration > 1 {
                tokio::time::sleep(self.settings.iteration_delay).await;
            }
            info!("API iteration {iteration}/{max_iterations}...");

            let request = self.params.request(&conversation);
            let response = self.call_with_backoff(&request).await?;

            let status = match response.stop_reason.clone() {
                Some(StopReason::EndTurn) => {
                    info!("Received final response");
                    CompletionStatus::Final
                }
                Some(StopReason::MaxTokens) => {
                    warn!("Response hit max_tokens; using the truncated answer");
                    CompletionStatus::Truncated
                }
                Some(StopReason::ToolUse) => {
                    info!(
                        "Found {} tool use(s), continuing conversation...",
                        response.tool_use_count()
                    );
                    conversation.push(response.to_assistant_message());
                    conversation.push(Message::user(api::CONTINUATION_PROMPT));
                    intermediate.push(response);
                    continue;
                }
                other => {
                    let reason = other
                        .map(String::from)
                        .unwrap_or_else(|| "none".to_string());
                    warn!("Unexpected stop reason: {reason}");
                    CompletionStatus::UnexpectedStop(reason)
                }
            };

            return Ok(ConversationOutcome {
                response,
                intermediate,
                conversation,
                iterations: iteration,
                status,
            });
        }

        error!("Exceeded maximum iterations ({max_iterations})");
        let response = intermediate
            .pop()
            .ok_or_else(|| AppError::api_stream("conversation produced no response"))?;
        Ok(ConversationOutcome {
            response,
            intermediate,
            conversation,
            iterations: max_iterations,
            status: CompletionStatus::IterationLimit,
        })
    }

    /// One API call with exponential backoff on rate-limit rejections only.
    async fn call_with_backoff(
        &self,
        request: &MessagesRequest,
    ) -> Result<MessageResponse, AppError> {
        let max_attempts = self.settings.max_rate_limit_attempts.max(1);
        let mut attempt = 1u32;

        loop {
            match self.api.create_message(request).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_rate_limit() && attempt < max_attempts => {
                    let wait = rate_limit_delay(self.settings.rate_limit_base_delay, attempt - 1);
                    warn!(
                        "Rate limited. Retrying in {:?} (attempt {}/{})",
                        wait, attempt, max_attempts
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(e) => {
                    if e.is_rate_limit() {
                        error!("Still rate limited after {attempt} attempts, giving up");
                    } else {
                        error!("Error calling the messages API: {e}");
                    }
                    return Err(e);
                }
            }
        }
    }
}
