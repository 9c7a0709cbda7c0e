//! Error types for the summarization pipeline.

use thiserror::Error;

/// Summarization pipeline error type.
///
/// The backend client classifies transport-level conditions into this
/// taxonomy; the retry loop retries every kind uniformly and surfaces only
/// the last attempt's error.
#[derive(Clone, Debug, Error)]
pub enum SummarizeError {
    /// The generation backend refused the connection.
    #[error("cannot connect to generation backend at {0}")]
    BackendUnreachable(String),
    /// The generation request exceeded the per-attempt timeout.
    #[error("generation request timed out")]
    BackendTimeout,
    /// The backend answered 404: the model or route is not set up.
    #[error("generation model is not available on the backend")]
    BackendNotConfigured,
    /// The backend answered but produced no usable output.
    #[error("summarization failed: {0}")]
    SummarizationFailed(String),
    /// Any other transport-level failure, with the underlying message.
    #[error("backend transport error: {0}")]
    TransportOther(String),
}

/// Convenience result alias for summarization operations.
pub type SummarizeResult<T> = Result<T, SummarizeError>;
