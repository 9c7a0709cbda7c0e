//! Password-protected note sharing with deterministic LLM summarization.
//!
//! Paste a note, get a shareable link and a single-use password; retrieve or
//! summarize the note later with that password. Summaries come from a local
//! Ollama-compatible backend and are post-processed into at most 3 short
//! bullets regardless of what the model returned.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::print_stdout)]

/// Note storage, passwords and the note-facing service.
pub mod notes;
/// HTTP server and API routes.
pub mod server;
/// Entry helpers to start the notelock server.
pub mod startup;
/// Summarization pipeline (backend client, retry, formatting).
pub mod summarize;
