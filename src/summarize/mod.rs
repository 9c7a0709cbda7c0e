//! Note summarization pipeline.
//!
//! Takes an arbitrary note body, invokes a local generation backend, and
//! deterministically post-processes whatever prose the model returns into a
//! bounded bullet summary:
//! - [`client`]: one HTTP call per attempt to the Ollama `/api/generate`
//!   endpoint, with transport errors classified into a fixed taxonomy
//! - [`retry`]: bounded retries with exponential backoff
//! - [`format`]: reduction of raw model output to at most 3 short bullets

pub mod client;
pub mod config;
pub mod error;
pub mod format;
pub mod retry;

pub use client::{CompletionBackend, OllamaClient, RawCompletion};
pub use config::SummarizerConfig;
pub use error::{SummarizeError, SummarizeResult};
pub use format::{FormattedSummary, format_summary};
pub use retry::{RetryPolicy, with_retry};

use std::sync::Arc;

use tracing::debug;

/// Fixed prompt template. Guidance only: the backend is not trusted to
/// comply, [`format_summary`] is the actual enforcement.
fn build_prompt(note_text: &str) -> String {
    format!(
        "Summarize the following text.\n\n\
         Rules:\n\
         - Maximum 3 bullet points\n\
         - Each bullet must be under 6 words\n\
         - No full sentences\n\
         - No explanations\n\
         - Use simple phrases\n\
         Text:\n\
         \"{note_text}\""
    )
}

/// Summarization service: retrying backend calls piped through the
/// deterministic formatter.
///
/// Stateless between calls; concurrent invocations share nothing but the
/// backend handle, so each performs its own retry loop independently.
pub struct Summarizer {
    backend: Arc<dyn CompletionBackend>,
    retry: RetryPolicy,
}

impl Summarizer {
    /// Build a summarizer against a real Ollama backend.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be created.
    pub fn new(config: &SummarizerConfig) -> SummarizeResult<Self> {
        config.validate()?;
        let backend = OllamaClient::new(config)?;
        Ok(Self {
            backend: Arc::new(backend),
            retry: config.retry_policy(),
        })
    }

    /// Build a summarizer with an injected backend, for tests and embedding.
    #[must_use]
    pub fn with_backend(backend: Arc<dyn CompletionBackend>, retry: RetryPolicy) -> Self {
        Self { backend, retry }
    }

    /// Summarize a note body into a bounded bullet summary.
    ///
    /// An empty or whitespace-only completion counts as a failed attempt and
    /// is retried like a transport error; the formatter itself never fails.
    ///
    /// # Errors
    /// Returns the last attempt's classified error once the retry budget is
    /// exhausted.
    pub async fn summarize(&self, note_text: &str) -> SummarizeResult<FormattedSummary> {
        let prompt = build_prompt(note_text);

        let raw = with_retry(&self.retry, || {
            let prompt = prompt.clone();
            async move {
                let completion = self.backend.generate(prompt).await?;
                let trimmed = completion.text.trim();
                if trimmed.is_empty() {
                    return Err(SummarizeError::SummarizationFailed(
                        "empty response".to_string(),
                    ));
                }
                Ok(trimmed.to_string())
            }
        })
        .await?;

        let summary = format_summary(&raw);
        debug!(bullets = summary.bullets.len(), "summary formatted");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use super::client::BackendFuture;
    use super::*;

    /// Deterministic backend stub returning canned completions per attempt.
    struct StubBackend {
        responses: Vec<SummarizeResult<String>>,
        calls: AtomicU32,
    }

    impl StubBackend {
        fn new(responses: Vec<SummarizeResult<String>>) -> Arc<Self> {
            Arc::new(Self {
                responses,
                calls: AtomicU32::new(0),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl CompletionBackend for StubBackend {
        fn generate(&self, _prompt: String) -> BackendFuture<'_, SummarizeResult<RawCompletion>> {
            Box::pin(async move {
                let call = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
                let index = call.min(self.responses.len().saturating_sub(1));
                match &self.responses[index] {
                    Ok(text) => Ok(RawCompletion { text: text.clone() }),
                    Err(err) => Err(err.clone()),
                }
            })
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
        }
    }

    #[test]
    fn test_prompt_template() {
        let prompt = build_prompt("pay the rent");
        assert!(prompt.starts_with("Summarize the following text."));
        assert!(prompt.contains("- Maximum 3 bullet points"));
        assert!(prompt.contains("- Each bullet must be under 6 words"));
        assert!(prompt.ends_with("\"pay the rent\""));
    }

    #[tokio::test]
    async fn test_summarize_formats_backend_output() {
        let backend = StubBackend::new(vec![Ok(
            "Here is a summary:\n- Pay rent\n- Water plants".to_string()
        )]);
        let summarizer = Summarizer::with_backend(backend, fast_policy());

        let summary = summarizer.summarize("note text").await;
        let summary = match summary {
            Ok(summary) => summary,
            Err(err) => panic!("summarize failed: {err}"),
        };
        assert_eq!(summary.bullets, vec!["Pay rent", "Water plants"]);
        assert_eq!(summary.rendered_text, "• Pay rent\n• Water plants");
    }

    #[tokio::test]
    async fn test_summarize_is_idempotent() {
        let backend = StubBackend::new(vec![Ok("- Fixed output".to_string())]);
        let summarizer = Summarizer::with_backend(backend, fast_policy());

        let first = summarizer.summarize("same input").await.ok();
        let second = summarizer.summarize("same input").await.ok();
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried_to_success() {
        let backend = StubBackend::new(vec![
            Err(SummarizeError::BackendTimeout),
            Err(SummarizeError::BackendUnreachable("http://x".to_string())),
            Ok("- Eventually worked".to_string()),
        ]);
        let summarizer = Summarizer::with_backend(backend.clone(), fast_policy());

        let summary = summarizer.summarize("note").await;
        assert!(summary.is_ok());
        assert_eq!(backend.calls(), 3);
    }

    #[tokio::test]
    async fn test_empty_response_is_retried_then_fails() {
        let backend = StubBackend::new(vec![Ok("   \n  ".to_string())]);
        let summarizer = Summarizer::with_backend(backend.clone(), fast_policy());

        let result = summarizer.summarize("note").await;
        assert_eq!(backend.calls(), 3);
        match result {
            Err(SummarizeError::SummarizationFailed(msg)) => assert_eq!(msg, "empty response"),
            other => panic!("expected SummarizationFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_model_surfaces_not_configured() {
        let backend = StubBackend::new(vec![Err(SummarizeError::BackendNotConfigured)]);
        let summarizer = Summarizer::with_backend(backend.clone(), fast_policy());

        let result = summarizer.summarize("note").await;
        assert_eq!(backend.calls(), 3);
        assert!(matches!(result, Err(SummarizeError::BackendNotConfigured)));
    }
}
