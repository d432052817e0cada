//! GeminiGenerator -- concrete [`TextGenerator`] for Google Gemini.
//!
//! Sends a single-turn prompt to `/v1beta/models/{model}:generateContent`
//! and returns the text of the first candidate.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is sent in the
//! `x-goog-api-key` header rather than the query string, so it never shows
//! up in request URLs, error messages, or `Debug` output.

use std::time::Duration;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use tracing::Instrument;

use saathi_core::llm::TextGenerator;
use saathi_types::llm::GenerationError;

use super::types::{ErrorResponse, GenerateContentRequest, GenerateContentResponse};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Google Gemini text generator.
pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl GeminiGenerator {
    /// Create a generator for `model` with a per-request `timeout`.
    pub fn new(
        api_key: SecretString,
        model: String,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::Provider {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model,
            timeout,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    async fn send(&self, prompt: &str) -> Result<String, GenerationError> {
        let body = GenerateContentRequest::from_prompt(prompt);

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after_ms = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(|secs| secs * 1000);
            let error_body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &error_body, retry_after_ms));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                GenerationError::Timeout(self.timeout.as_secs())
            } else {
                GenerationError::InvalidResponse(format!("failed to parse response: {e}"))
            }
        })?;

        match parsed.text() {
            Some(text) => Ok(text),
            None => {
                let reason = parsed
                    .prompt_feedback
                    .and_then(|f| f.block_reason)
                    .or_else(|| {
                        parsed
                            .candidates
                            .first()
                            .and_then(|c| c.finish_reason.clone())
                    })
                    .unwrap_or_else(|| "no candidates".to_string());
                Err(GenerationError::InvalidResponse(format!(
                    "response contained no text ({reason})"
                )))
            }
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> GenerationError {
        if e.is_timeout() {
            GenerationError::Timeout(self.timeout.as_secs())
        } else {
            GenerationError::Provider {
                message: format!("HTTP request failed: {e}"),
            }
        }
    }
}

/// Map a non-success HTTP status to a [`GenerationError`].
///
/// Gemini reports an invalid key as `400 INVALID_ARGUMENT`, so a 400 whose
/// message mentions the API key is treated as an authentication failure.
fn classify_status(
    status: StatusCode,
    body: &str,
    retry_after_ms: Option<u64>,
) -> GenerationError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());

    match status.as_u16() {
        401 | 403 => GenerationError::AuthenticationFailed,
        400 if message.to_lowercase().contains("api key") => {
            GenerationError::AuthenticationFailed
        }
        429 => GenerationError::RateLimited { retry_after_ms },
        code if status.is_server_error() => GenerationError::Provider {
            message: format!("HTTP {code}: {message}"),
        },
        code => GenerationError::InvalidResponse(format!("HTTP {code}: {message}")),
    }
}

// Debug is hand-written so the key field is never part of the output.
impl std::fmt::Debug for GeminiGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiGenerator")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl TextGenerator for GeminiGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let span = tracing::info_span!(
            "gen_ai.generate_content",
            "gen_ai.operation.name" = "generate_content",
            "gen_ai.provider.name" = "gemini",
            "gen_ai.request.model" = %self.model,
        );

        async {
            let started = std::time::Instant::now();
            let result = self.send(prompt).await;
            match &result {
                Ok(text) => tracing::debug!(
                    chars = text.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "generation completed"
                ),
                Err(e) => tracing::warn!(error = %e, "generation failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}
