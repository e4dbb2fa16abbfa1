//! Translation through an OpenAI-compatible chat-completion endpoint.
//!
//! # Architecture
//!
//! - [`AskAsync`]: one request/response exchange with a language model
//! - [`ChatClient`]: the HTTP implementation of [`AskAsync`]
//! - [`RetryAsk`]: decorator that retries any [`AskAsync`] with a fixed delay
//! - [`Translator`]: fail-open front end used by the pipeline
//!
//! # Retry Strategy
//!
//! - Transport errors, non-2xx responses and malformed bodies all count as a
//!   failed attempt
//! - Fixed delay between attempts (5 seconds by default)
//! - At most 5 attempts by default; after that the caller gets the last error
//!
//! [`Translator::translate`] turns that final error into the original text, so
//! a translation outage degrades the output instead of ending the run.

use crate::config::{TranslateSettings, TranslatorConfig};
use crate::error::TranslateError;
use crate::utils::truncate_for_log;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

/// Trait for async LLM interaction.
pub trait AskAsync {
    /// The type of response returned by the LLM.
    type Response;

    /// Send text to the LLM and receive a response.
    async fn ask(&self, text: &str) -> Result<Self::Response, TranslateError>;
}

/// Retries an [`AskAsync`] implementation a bounded number of times with a
/// fixed delay between attempts.
#[derive(Debug)]
pub struct RetryAsk<T> {
    inner: T,
    /// Total attempts, including the first one.
    max_attempts: usize,
    delay: Duration,
}

impl<T> RetryAsk<T>
where
    T: AskAsync,
{
    pub fn new(inner: T, max_attempts: usize, delay: Duration) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    #[cfg(test)]
    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }
}

impl<T> AskAsync for RetryAsk<T>
where
    T: AskAsync,
{
    type Response = T::Response;

    #[instrument(level = "debug", skip_all)]
    async fn ask(&self, text: &str) -> Result<Self::Response, TranslateError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            attempt += 1;
            match self.inner.ask(text).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    let total_dt = total_t0.elapsed();
                    if attempt >= self.max_attempts {
                        error!(
                            attempt,
                            max = self.max_attempts,
                            elapsed_ms_total = total_dt.as_millis() as u64,
                            error = %e,
                            "ask() exhausted retries"
                        );
                        return Err(e);
                    }
                    warn!(
                        attempt,
                        max = self.max_attempts,
                        elapsed_ms_total = total_dt.as_millis() as u64,
                        delay = ?self.delay,
                        error = %e,
                        "ask() attempt failed; retrying"
                    );
                    sleep(self.delay).await;
                }
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

/// Pull the trimmed reply text out of a chat-completion response body.
pub fn parse_reply(body: &str) -> Result<String, TranslateError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| TranslateError::Malformed(format!("{} in {}", e, truncate_for_log(body, 200))))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|content| content.trim().to_string())
        .ok_or_else(|| TranslateError::Malformed("no choices[0].message.content".to_string()))
}

/// [`AskAsync`] over HTTP: one system instruction plus the text as the user
/// message, bearer-authenticated.
#[derive(Debug)]
pub struct ChatClient<'a> {
    client: Client,
    config: &'a TranslatorConfig,
    system_instruction: String,
}

impl<'a> ChatClient<'a> {
    pub fn new(config: &'a TranslatorConfig, settings: &TranslateSettings) -> Result<Self, TranslateError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            config,
            system_instruction: settings.system_instruction(),
        })
    }
}

impl<'a> AskAsync for ChatClient<'a> {
    type Response = String;

    #[instrument(level = "debug", skip_all, fields(model = %self.config.model))]
    async fn ask(&self, text: &str) -> Result<Self::Response, TranslateError> {
        let t0 = Instant::now();
        let payload = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &self.system_instruction,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
        };

        let resp = self
            .client
            .post(&self.config.api_base)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        let dt = t0.elapsed();

        if !status.is_success() {
            warn!(elapsed_ms = dt.as_millis() as u64, status = status.as_u16(), "API call failed");
            return Err(TranslateError::Status {
                status: status.as_u16(),
                body: truncate_for_log(&body, 200),
            });
        }
        parse_reply(&body)
    }
}

/// Fail-open translator: always returns a string.
#[derive(Debug)]
pub struct Translator<T> {
    api: RetryAsk<T>,
    fallbacks: AtomicUsize,
}

impl<T> Translator<T>
where
    T: AskAsync<Response = String>,
{
    pub fn new(inner: T, settings: &TranslateSettings) -> Self {
        Self::with_policy(
            inner,
            settings.max_attempts,
            Duration::from_secs(settings.retry_delay_secs),
        )
    }

    pub fn with_policy(inner: T, max_attempts: usize, delay: Duration) -> Self {
        Self {
            api: RetryAsk::new(inner, max_attempts, delay),
            fallbacks: AtomicUsize::new(0),
        }
    }

    #[cfg(test)]
    pub fn api(&self) -> &RetryAsk<T> {
        &self.api
    }

    /// Number of texts that were returned untranslated so far.
    pub fn fallbacks(&self) -> usize {
        self.fallbacks.load(Ordering::Relaxed)
    }

    /// Translate one text unit. On final failure the input is returned as is.
    #[instrument(level = "info", skip_all, fields(chars = text.chars().count()))]
    pub async fn translate(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }
        let t0 = Instant::now();
        match self.api.ask(text).await {
            Ok(translated) => {
                info!(elapsed_ms_total = t0.elapsed().as_millis() as u64, "Translated");
                translated
            }
            Err(e) => {
                self.fallbacks.fetch_add(1, Ordering::Relaxed);
                warn!(
                    attempts = self.api.max_attempts(),
                    error = %e,
                    preview = %truncate_for_log(text, 80),
                    "Translation failed after all attempts; using original text"
                );
                text.to_string()
            }
        }
    }
}
