//! Chat backend abstraction.
//!
//! `ChatBackend` is an enum over concrete backend implementations.
//! Add a new variant + module in `backends/` for each additional backend.
//!
//! Backend instances are shared immutable capabilities — clone them freely.
//! Async is delegated to the underlying backend; the methods are `async fn`
//! on the enum so callers need no trait-object machinery.
//!
//! Every failure crossing this boundary is a single user-presentable
//! description; raw transport detail stays in the logs.

pub mod backends;

use thiserror::Error;

use crate::config::ApiConfig;

// ── Fixed failure descriptions ────────────────────────────────────────────────

pub(crate) const SEND_FAILED: &str =
    "Failed to send message. Please check your connection and try again.";
pub(crate) const HISTORY_FAILED: &str = "Failed to load conversation history.";
pub(crate) const CLEAR_FAILED: &str = "Failed to clear conversation.";

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unknown backend: {0}")]
    UnknownBackend(String),
    /// A failed request, carrying only its user-presentable description.
    #[error("{0}")]
    Request(String),
}

// ── Reply types ───────────────────────────────────────────────────────────────

/// Decoded `/chat` response body. All fields are optional on the wire.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub message: Option<String>,
    pub reply: Option<String>,
    pub conversation_id: Option<String>,
    pub usage: Option<ChatUsage>,
}

/// Token accounting, when the backend reports it.
#[derive(Debug, Clone, Copy)]
pub struct ChatUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl ChatReply {
    /// The reply text: first non-empty of `message` / `reply`.
    pub fn text(&self) -> Option<&str> {
        non_empty(self.message.as_deref()).or_else(|| non_empty(self.reply.as_deref()))
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}

// ── Backend enum ──────────────────────────────────────────────────────────────

/// All available backend implementations.
///
/// Enum dispatch avoids `dyn` trait objects and the `async-trait` dependency.
/// Adding a backend = new module + new variant + new arm per method.
#[derive(Debug, Clone)]
pub enum ChatBackend {
    Http(backends::http::HttpBackend),
    Dummy(backends::dummy::DummyBackend),
}

impl ChatBackend {
    /// One round-trip: send `text` (plus prior conversation context) and
    /// return the decoded reply.
    pub async fn send(
        &self,
        text: &str,
        conversation_id: Option<&str>,
    ) -> Result<ChatReply, ApiError> {
        match self {
            ChatBackend::Http(b) => b.send(text, conversation_id).await,
            ChatBackend::Dummy(b) => b.send(text).await,
        }
    }

    /// Fetch a conversation's prior messages, decoded verbatim.
    pub async fn conversation_history(
        &self,
        conversation_id: &str,
    ) -> Result<serde_json::Value, ApiError> {
        match self {
            ChatBackend::Http(b) => b.conversation_history(conversation_id).await,
            ChatBackend::Dummy(b) => b.conversation_history(conversation_id).await,
        }
    }

    /// Delete a conversation on the backend.
    pub async fn clear_conversation(&self, conversation_id: &str) -> Result<(), ApiError> {
        match self {
            ChatBackend::Http(b) => b.clear_conversation(conversation_id).await,
            ChatBackend::Dummy(b) => b.clear_conversation(conversation_id).await,
        }
    }

    /// `true` iff the backend answers its health endpoint with HTTP success.
    /// Never errors.
    pub async fn health_check(&self) -> bool {
        match self {
            ChatBackend::Http(b) => b.health_check().await,
            ChatBackend::Dummy(b) => b.health_check().await,
        }
    }
}

// ── Factory ───────────────────────────────────────────────────────────────────

/// Construct a `ChatBackend` from config. Called at startup.
pub fn build(config: &ApiConfig) -> Result<ChatBackend, ApiError> {
    match config.backend.as_str() {
        "dummy" => Ok(ChatBackend::Dummy(backends::dummy::DummyBackend::new())),
        "http" => {
            let http = &config.http;
            let b = backends::http::HttpBackend::new(http.base_url.clone(), http.timeout_ms)?;
            Ok(ChatBackend::Http(b))
        }
        _ => Err(ApiError::UnknownBackend(config.backend.clone())),
    }
}
