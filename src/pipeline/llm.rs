//! Chat-completion client with bounded retry on rate limiting.
//!
//! The document text and question arrive as one prompt; this module wraps it
//! in a chat request, POSTs it to an OpenAI-compatible `/chat/completions`
//! endpoint and returns the first choice's message content.
//!
//! ## Retry Strategy
//!
//! Only HTTP 429 is retried. The wait starts at
//! [`RetryPolicy::initial_delay`] and doubles after every rate-limited
//! attempt; with the defaults (5 attempts, 5 s) the waits are
//! 5 s → 10 s → 20 s → 40 s and the fifth 429 ends the call. Every other
//! failure, including getting no response at all, ends the call on the spot.
//!
//! There is no wait after the last rate-limited attempt: an all-429 call
//! returns "max retries exceeded" as soon as the final 429 arrives, so the
//! waits are exactly [`RetryPolicy::schedule`].
//!
//! Failures never surface as `Err`: the caller always gets a
//! [`Reply`], whose failure variants print as fixed sentinel strings.

use crate::config::{ApiKey, QaConfig};
use crate::error::{CompletionFailure, PdfQaError};
use crate::output::{AttemptOutcome, CompletionReport, Reply};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

/// Anything that can turn a prompt into a [`Reply`].
///
/// The session loop only sees this trait, which keeps it testable without a
/// network.
#[async_trait]
pub trait Completer: Send + Sync {
    async fn complete(&self, prompt: &str) -> Reply;
}

/// How many times to try and how long to wait between tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, counting the first.
    pub max_attempts: u32,
    /// Wait before the first retry.
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// The waits an all-429 call goes through, in order.
    ///
    /// One fewer than `max_attempts`: there is nothing to wait for after the
    /// last attempt.
    pub fn schedule(&self) -> Vec<Duration> {
        let mut delay = self.initial_delay;
        (1..self.max_attempts)
            .map(|_| {
                let current = delay;
                delay = delay.saturating_mul(2);
                current
            })
            .collect()
    }
}

// ── Wire types ───────────────────────────────────────────────────────────

/// One entry of the `messages` array.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request body for `POST /chat/completions`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Pull `choices[0].message.content` out of a response body.
fn parse_answer(body: &str) -> Result<String, String> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| format!("invalid response body: {}", e))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| "response has no choices[0].message.content".to_string())
}

// ── Client ───────────────────────────────────────────────────────────────

/// HTTP client for an OpenAI-compatible chat-completion endpoint.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    http: reqwest::Client,
    api_key: ApiKey,
    endpoint: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    retry: RetryPolicy,
}

impl CompletionClient {
    /// Build a client from a validated config.
    pub fn new(config: &QaConfig) -> Result<Self, PdfQaError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| PdfQaError::MissingApiKey {
                var: crate::config::API_KEY_ENV.to_string(),
            })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| PdfQaError::HttpClient(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            endpoint: config.endpoint(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            retry: RetryPolicy {
                max_attempts: config.max_attempts,
                initial_delay: config.initial_backoff,
            },
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Request body for `prompt`.
    pub fn build_request(&self, prompt: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }

    /// Send one request and classify what came back.
    pub async fn attempt(&self, request: &ChatRequest) -> AttemptOutcome {
        let response = match self
            .http
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose())
            .json(request)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return AttemptOutcome::TransportFailure(e.to_string()),
        };

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return AttemptOutcome::RateLimited;
        }

        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => return AttemptOutcome::TransportFailure(e.to_string()),
        };

        if !status.is_success() {
            return AttemptOutcome::OtherError(format!("HTTP {}: {}", status, body.trim()));
        }

        match parse_answer(&body) {
            Ok(text) => AttemptOutcome::Success(text),
            Err(detail) => AttemptOutcome::OtherError(detail),
        }
    }

    /// Run the retry loop for one prompt and report how it went.
    pub async fn complete_with_report(&self, prompt: &str) -> CompletionReport {
        let start = Instant::now();
        let mut waits = self.retry.schedule().into_iter();
        let mut backoff_delays = Vec::new();
        let mut attempts = 0u32;

        let reply = loop {
            let request = self.build_request(prompt);
            attempts += 1;

            match self.attempt(&request).await {
                AttemptOutcome::Success(text) => {
                    debug!(
                        "Answer received after {} attempt(s), {} chars",
                        attempts,
                        text.len()
                    );
                    break Reply::Answer(text);
                }
                AttemptOutcome::RateLimited => {
                    let Some(delay) = waits.next() else {
                        warn!("Rate limit exceeded on all {} attempts", attempts);
                        break Reply::Failed(CompletionFailure::RetriesExhausted { attempts });
                    };
                    warn!(
                        "Rate limit exceeded. Retrying in {:.1} seconds... (attempt {}/{})",
                        delay.as_secs_f64(),
                        attempts,
                        self.retry.max_attempts
                    );
                    tokio::time::sleep(delay).await;
                    backoff_delays.push(delay);
                }
                AttemptOutcome::OtherError(detail) | AttemptOutcome::TransportFailure(detail) => {
                    error!("An error occurred while querying the model: {}", detail);
                    break Reply::Failed(CompletionFailure::Unavailable { detail });
                }
            }
        };

        CompletionReport {
            reply,
            attempts,
            backoff_delays,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }
}

#[async_trait]
impl Completer for CompletionClient {
    async fn complete(&self, prompt: &str) -> Reply {
        self.complete_with_report(prompt).await.reply
    }
}
