//! HTTP chat backend.
//!
//! One-shot request/response wrapper around the chat API described in the
//! deployment config: `POST /chat`, `GET /conversation/{id}`,
//! `DELETE /conversation/{id}`, `GET /health`. All wire types are private to
//! this module — callers see [`ChatReply`] and `serde_json::Value` only.
//! No retry, backoff, or circuit-breaking lives here; every failure is
//! surfaced once, as a user-presentable description.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::api::{ApiError, ChatReply, ChatUsage, CLEAR_FAILED, HISTORY_FAILED, SEND_FAILED};

// ── Public backend ────────────────────────────────────────────────────────────

/// Client for a chat API deployment.
///
/// Constructed once at startup, then cheaply cloned because
/// `reqwest::Client` is an `Arc` internally.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Build a backend from config values.
    ///
    /// `timeout_ms` bounds every request this client issues; there is no
    /// cancellation beyond it.
    pub fn new(base_url: String, timeout_ms: u64) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| ApiError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Send `text` as one exchange; `conversation_id` carries prior context
    /// and is omitted from the wire when absent.
    pub async fn send(
        &self,
        text: &str,
        conversation_id: Option<&str>,
    ) -> Result<ChatReply, ApiError> {
        let payload = ChatRequest { message: text, conversation_id };

        debug!(
            content_len = text.len(),
            has_context = conversation_id.is_some(),
            "sending chat request"
        );

        let response = self
            .client
            .post(format!("{}/chat", self.base_url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(url = %self.base_url, error = %e, "chat request failed (transport)");
                ApiError::Request(SEND_FAILED.to_string())
            })?;

        let response = check_status(response).await?;

        let body: ChatResponseBody = response.json().await.map_err(|e| {
            error!(error = %e, "failed to decode chat response");
            ApiError::Request(SEND_FAILED.to_string())
        })?;

        debug!(
            has_conversation_id = body.conversation_id.is_some(),
            "received chat response"
        );

        Ok(ChatReply {
            message: body.message,
            reply: body.reply,
            conversation_id: body.conversation_id,
            usage: body.usage.map(|u| ChatUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            }),
        })
    }

    /// Fetch the prior messages of a conversation, decoded verbatim.
    pub async fn conversation_history(
        &self,
        conversation_id: &str,
    ) -> Result<serde_json::Value, ApiError> {
        let response = self
            .client
            .get(format!("{}/conversation/{conversation_id}", self.base_url))
            .send()
            .await
            .map_err(|e| {
                error!(%conversation_id, error = %e, "history request failed (transport)");
                ApiError::Request(HISTORY_FAILED.to_string())
            })?;

        if !response.status().is_success() {
            error!(%conversation_id, status = %response.status(), "history request returned HTTP error");
            return Err(ApiError::Request(HISTORY_FAILED.to_string()));
        }

        response.json().await.map_err(|e| {
            error!(%conversation_id, error = %e, "failed to decode history response");
            ApiError::Request(HISTORY_FAILED.to_string())
        })
    }

    /// Delete a conversation on the backend.
    pub async fn clear_conversation(&self, conversation_id: &str) -> Result<(), ApiError> {
        let result = self
            .client
            .delete(format!("{}/conversation/{conversation_id}", self.base_url))
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => Ok(()),
            Ok(response) => {
                error!(%conversation_id, status = %response.status(), "conversation clear returned HTTP error");
                Err(ApiError::Request(CLEAR_FAILED.to_string()))
            }
            Err(e) => {
                error!(%conversation_id, error = %e, "conversation clear failed (transport)");
                Err(ApiError::Request(CLEAR_FAILED.to_string()))
            }
        }
    }

    /// `true` iff `GET /health` answers with HTTP success. Never errors —
    /// transport failures log and read as unhealthy.
    pub async fn health_check(&self) -> bool {
        match self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!(url = %self.base_url, error = %e, "health check failed");
                false
            }
        }
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    #[serde(rename = "conversationId", skip_serializing_if = "Option::is_none")]
    conversation_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    reply: Option<String>,
    #[serde(rename = "conversationId", default)]
    conversation_id: Option<String>,
    #[serde(default)]
    usage: Option<UsageData>,
}

#[derive(Debug, Deserialize)]
struct UsageData {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

// Error envelope used by the chat API.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    message: String,
}

/// Consume the response and return it if successful, or the failure's
/// description: the body's `message` field when parseable, else the fixed
/// fallback.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|env| env.message)
        .unwrap_or_else(|_| SEND_FAILED.to_string());

    error!(%status, %message, "chat request returned HTTP error");
    Err(ApiError::Request(message))
}
