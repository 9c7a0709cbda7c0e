//! Configuration for the summarization pipeline.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use super::error::{SummarizeError, SummarizeResult};
use super::retry::RetryPolicy;

/// Environment variable for a custom Ollama URL (e.g. "http://10.0.0.2:11434").
const OLLAMA_URL_ENV: &str = "NOTELOCK_OLLAMA_URL";

/// Environment variable for the completion model name.
const MODEL_ENV: &str = "NOTELOCK_MODEL";

/// Default Ollama base URL.
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";

/// Default completion model.
const DEFAULT_MODEL: &str = "llama3";

/// Per-attempt timeout for generation requests.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Configuration for the summarization service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SummarizerConfig {
    /// Base URL of the Ollama-compatible generation backend.
    pub base_url: String,
    /// Completion model name.
    pub model: String,
    /// Per-attempt request timeout.
    #[serde(with = "duration_serde")]
    pub request_timeout: Duration,
    /// Maximum attempts per summarization call.
    pub max_attempts: u32,
    /// Base delay between retries in milliseconds.
    pub base_delay_ms: u64,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_attempts: 3,
            base_delay_ms: 1000,
        }
    }
}

impl SummarizerConfig {
    /// Build a config from the environment, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(base_url) = std::env::var(OLLAMA_URL_ENV) {
            config.base_url = base_url;
        }
        if let Ok(model) = std::env::var(MODEL_ENV) {
            config.model = model;
        }
        config
    }

    /// Set the backend base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the completion model name.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> SummarizeResult<()> {
        Url::parse(&self.base_url)
            .map_err(|e| SummarizeError::TransportOther(format!("invalid base url: {e}")))?;
        if self.model.trim().is_empty() {
            return Err(SummarizeError::TransportOther(
                "model must not be empty".to_string(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(SummarizeError::TransportOther(
                "max_attempts must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Retry policy derived from this config.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
        }
    }
}

/// Serde module for Duration serialization.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
