//! HTTP client for the Ollama-compatible generation backend.
//!
//! One outbound POST to `/api/generate` per attempt, deterministic sampling
//! (temperature 0), no streaming. Transport conditions are classified into
//! the [`SummarizeError`] taxonomy here; retrying is the caller's concern.

use std::future::Future;
use std::pin::Pin;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::SummarizerConfig;
use super::error::{SummarizeError, SummarizeResult};

/// Boxed future type for completion backend operations.
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Raw, unprocessed output of one generation call.
#[derive(Clone, Debug)]
pub struct RawCompletion {
    /// Text exactly as the backend returned it.
    pub text: String,
}

/// Seam for the generation backend, substitutable at construction time.
pub trait CompletionBackend: Send + Sync {
    /// Send a prompt to the backend and return its raw completion.
    ///
    /// # Errors
    /// Returns a classified error for transport-level failures.
    fn generate(&self, prompt: String) -> BackendFuture<'_, SummarizeResult<RawCompletion>>;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

/// Reqwest-backed client for the Ollama `/api/generate` endpoint.
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    /// Build a client from the summarizer configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &SummarizerConfig) -> SummarizeResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SummarizeError::TransportOther(format!("http client error: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    async fn post_generate(&self, prompt: &str) -> SummarizeResult<RawCompletion> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            temperature: 0.0,
        };

        let url = format!("{}/api/generate", self.base_url);
        debug!(model = %self.model, "sending generation request");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|err| classify_transport_error(&err, &self.base_url))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(SummarizeError::BackendNotConfigured);
        }
        if !status.is_success() {
            return Err(SummarizeError::TransportOther(format!(
                "backend returned status {status}"
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| SummarizeError::TransportOther(format!("malformed response: {e}")))?;

        let text = body.response.ok_or_else(|| {
            SummarizeError::TransportOther("response body missing 'response' field".to_string())
        })?;

        Ok(RawCompletion { text })
    }
}

impl CompletionBackend for OllamaClient {
    fn generate(&self, prompt: String) -> BackendFuture<'_, SummarizeResult<RawCompletion>> {
        Box::pin(async move { self.post_generate(&prompt).await })
    }
}

/// Map a reqwest failure onto the error taxonomy.
fn classify_transport_error(err: &reqwest::Error, base_url: &str) -> SummarizeError {
    if err.is_timeout() {
        SummarizeError::BackendTimeout
    } else if err.is_connect() {
        SummarizeError::BackendUnreachable(base_url.to_string())
    } else {
        SummarizeError::TransportOther(err.to_string())
    }
}
