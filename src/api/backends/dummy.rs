//! Dummy chat backend — echoes input back prefixed with `[echo]`.
//! Used for exercising the full session round-trip without a server.

use serde_json::json;

use crate::api::{ApiError, ChatReply, SEND_FAILED};

#[derive(Debug, Clone, Default)]
pub struct DummyBackend {
    fail: bool,
}

impl DummyBackend {
    pub fn new() -> Self {
        Self { fail: false }
    }

    /// Variant whose `send` always fails — exercises error paths.
    pub fn failing() -> Self {
        Self { fail: true }
    }

    pub async fn send(&self, text: &str) -> Result<ChatReply, ApiError> {
        if self.fail {
            return Err(ApiError::Request(SEND_FAILED.to_string()));
        }
        Ok(ChatReply {
            message: Some(format!("[echo] {text}")),
            reply: None,
            conversation_id: Some("dummy".to_string()),
            usage: None,
        })
    }

    pub async fn conversation_history(
        &self,
        _conversation_id: &str,
    ) -> Result<serde_json::Value, ApiError> {
        Ok(json!([]))
    }

    pub async fn clear_conversation(&self, _conversation_id: &str) -> Result<(), ApiError> {
        Ok(())
    }

    pub async fn health_check(&self) -> bool {
        true
    }
}
