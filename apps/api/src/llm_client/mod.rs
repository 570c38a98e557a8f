//! LLM Client: the single point of entry for all provider calls.
//!
//! ARCHITECTURAL RULE: No other module may call the provider API directly.
//! Matching code depends on the `LlmProvider` trait, never on `OpenAiClient`.
//!
//! Wire protocol: OpenAI chat completions (`POST {base_url}/chat/completions`).
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4";
/// First backoff delay; doubles on every retry (1s, 2s, 4s, ...).
const BACKOFF_BASE: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Per-call generation settings, taken from `Config` at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
    /// Total attempts per call, including the first.
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.1,
            max_tokens: 4000,
            timeout_seconds: 60,
            max_retries: 3,
        }
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("provider rejected credentials (status {status}): {message}")]
    Authentication { status: u16, message: String },

    #[error("provider rate limit exceeded: {message}")]
    RateLimited { message: String },

    #[error("provider did not respond within {seconds}s")]
    Timeout { seconds: u64 },

    #[error("provider error{}: {message}", .status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    Provider { status: Option<u16>, message: String },
}

impl LlmError {
    /// Authentication failures are fatal; everything else is transient.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, LlmError::Authentication { .. })
    }
}

/// A text-generation backend. Production uses `OpenAiClient`; tests plug in
/// deterministic stubs.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn generate(&self, prompt: &str, config: &LlmConfig) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_completion_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    error: ProviderErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorDetail {
    message: String,
}

/// Chat-completions client with per-attempt timeout and exponential backoff.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    backoff_base: Duration,
}

impl OpenAiClient {
    pub fn new(api_key: String, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            backoff_base: BACKOFF_BASE,
        }
    }

    /// Overrides the first backoff delay.
    #[cfg(test)]
    pub fn with_backoff_base(mut self, backoff_base: Duration) -> Self {
        self.backoff_base = backoff_base;
        self
    }

    /// One request, no retries.
    async fn send_once(&self, prompt: &str, config: &LlmConfig) -> Result<String, LlmError> {
        let request_body = ChatRequest {
            model: &config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompts::ANALYST_SYSTEM,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: config.temperature,
            max_completion_tokens: config.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| transport_error(e, config.timeout_seconds))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Try to parse error message
            let message = serde_json::from_str::<ProviderErrorBody>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(classify_status(status, message, config.timeout_seconds));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| transport_error(e, config.timeout_seconds))?;

        if let Some(usage) = &chat.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| LlmError::Provider {
                status: Some(status.as_u16()),
                message: "provider returned an empty completion".to_string(),
            })
    }
}

#[async_trait]
impl LlmProvider for OpenAiClient {
    async fn generate(&self, prompt: &str, config: &LlmConfig) -> Result<String, LlmError> {
        with_retries(config.max_retries, self.backoff_base, move |_| {
            self.send_once(prompt, config)
        })
        .await
    }
}

/// Runs `op` until it succeeds, fails with a non-retryable error, or
/// `max_attempts` attempts have been made. Sleeps `backoff_base * 2^(n-1)`
/// (capped) after the n-th failed attempt. The last error is returned.
pub async fn with_retries<T, F, Fut>(
    max_attempts: u32,
    backoff_base: Duration,
    mut op: F,
) -> Result<T, LlmError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) if attempt >= max_attempts => {
                warn!("LLM call failed after {attempt} attempt(s): {e}");
                return Err(e);
            }
            Err(e) => {
                let delay = backoff_delay(backoff_base, attempt);
                warn!(
                    "LLM call attempt {} failed ({}), retrying after {}ms...",
                    attempt,
                    e,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
    base.saturating_mul(factor).min(MAX_BACKOFF)
}

fn classify_status(status: StatusCode, message: String, timeout_seconds: u64) -> LlmError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::Authentication {
            status: status.as_u16(),
            message,
        },
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited { message },
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => LlmError::Timeout {
            seconds: timeout_seconds,
        },
        _ => LlmError::Provider {
            status: Some(status.as_u16()),
            message,
        },
    }
}

fn transport_error(e: reqwest::Error, timeout_seconds: u64) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout {
            seconds: timeout_seconds,
        }
    } else {
        LlmError::Provider {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}
