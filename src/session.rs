//! Conversation session state — the ordered message thread and its flags.
//!
//! [`ChatSession`] owns everything a presentation layer needs to render one
//! chat thread: the message list, a busy flag, the last failure description,
//! and the backend-side conversation token. It is a plain owned value — no
//! ambient singleton — constructed once per conversation around a
//! [`ChatBackend`]. All mutation goes through `&mut self`, so two exchanges
//! can never be in flight on the same session.
//!
//! User input follows an optimistic two-phase transition: the user entry is
//! appended as [`Delivery::Pending`] before the network call and marked
//! `Confirmed` or `Failed` when the exchange resolves. Failed exchanges keep
//! the user entry and add a synthesized error notice; nothing is fatal to
//! the session.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::api::ChatBackend;

/// Greeting seeded as the first message of every new session.
const GREETING: &str = "Hello! I'm your AI assistant. How can I help you today?";
/// Shown when the backend replied without any usable text.
const FALLBACK_REPLY: &str = "I received your message.";
/// Text of the synthesized in-thread notice for a failed exchange.
const ERROR_NOTICE: &str = "Sorry, I encountered an error. Please try again.";

// ── Message ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// Optimistic-update state of a message.
///
/// User entries are appended `Pending` and resolve to `Confirmed` or
/// `Failed`; locally synthesized assistant entries are born `Confirmed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Delivery {
    Pending,
    Confirmed,
    Failed,
}

/// One conversational turn. Immutable once created, except for the
/// `delivery` transition.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    /// v7 UUID — unique and creation-order comparable.
    pub id: Uuid,
    /// Never empty or all-whitespace.
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    /// Marks a synthesized failure notice rather than a genuine reply.
    pub is_error: bool,
    pub delivery: Delivery,
}

impl Message {
    fn user(text: &str) -> Self {
        Self {
            id: Uuid::now_v7(),
            text: text.to_string(),
            sender: Sender::User,
            timestamp: Utc::now(),
            is_error: false,
            delivery: Delivery::Pending,
        }
    }

    fn assistant(text: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            text,
            sender: Sender::Assistant,
            timestamp: Utc::now(),
            is_error: false,
            delivery: Delivery::Confirmed,
        }
    }

    fn error_notice() -> Self {
        Self {
            is_error: true,
            ..Self::assistant(ERROR_NOTICE.to_string())
        }
    }
}

// ── ChatSession ───────────────────────────────────────────────────────────────

pub struct ChatSession {
    backend: ChatBackend,
    messages: Vec<Message>,
    conversation_id: Option<String>,
    busy: bool,
    last_error: Option<String>,
}

impl ChatSession {
    /// Create a session around `backend`, seeded with the greeting.
    pub fn new(backend: ChatBackend) -> Self {
        Self {
            backend,
            messages: vec![Message::assistant(GREETING.to_string())],
            conversation_id: None,
            busy: false,
            last_error: None,
        }
    }

    // ── Read accessors (presentation boundary) ────────────────────────

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// `true` exactly while one exchange is in flight.
    pub fn busy(&self) -> bool {
        self.busy
    }

    /// Description of the most recent failed exchange, cleared on the next send.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Backend-side context token; absent until the first successful exchange
    /// returns one.
    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    // ── Operations ────────────────────────────────────────────────────

    /// Run one exchange: append the user entry, call the backend, reconcile.
    ///
    /// Empty or whitespace-only input is dropped silently — no state change,
    /// no network call, `None` returned. Otherwise returns a copy of the
    /// appended assistant entry (the reply, or the error notice on failure;
    /// failures also set [`last_error`](Self::last_error)).
    pub async fn send_message(&mut self, raw_text: &str) -> Option<Message> {
        let text = raw_text.trim();
        if text.is_empty() {
            return None;
        }

        self.last_error = None;
        self.messages.push(Message::user(text));
        let user_idx = self.messages.len() - 1;
        self.busy = true;

        match self.backend.send(text, self.conversation_id.as_deref()).await {
            Ok(reply) => {
                let text = reply.text().unwrap_or(FALLBACK_REPLY).to_string();
                // Adopt the returned context token; a response without one
                // keeps the prior token.
                if let Some(id) = reply.conversation_id {
                    self.conversation_id = Some(id);
                }
                self.messages[user_idx].delivery = Delivery::Confirmed;
                self.messages.push(Message::assistant(text));
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                self.messages[user_idx].delivery = Delivery::Failed;
                self.messages.push(Message::error_notice());
            }
        }

        self.busy = false;
        self.messages.last().cloned()
    }

    /// Reset the thread. Notifies the backend when a conversation token
    /// exists; that call is best-effort — its failure is logged and never
    /// blocks the local reset.
    pub async fn clear_messages(&mut self) {
        if let Some(id) = self.conversation_id.as_deref() {
            if let Err(e) = self.backend.clear_conversation(id).await {
                warn!(conversation_id = %id, "conversation clear failed: {e}");
            }
        }

        self.messages.clear();
        self.conversation_id = None;
        self.last_error = None;
    }

    /// Re-send the text of the most recent user entry.
    ///
    /// No-op returning `None` when no user entry exists. Otherwise drops
    /// every error notice from the thread and runs a fresh
    /// [`send_message`](Self::send_message) cycle — the original user entry
    /// remains, and a new one is appended with fresh id and timestamp.
    pub async fn retry_last_message(&mut self) -> Option<Message> {
        let text = self
            .messages
            .iter()
            .rev()
            .find(|m| m.sender == Sender::User)
            .map(|m| m.text.clone())?;

        debug!("retrying last user message");
        self.messages.retain(|m| !m.is_error);
        self.send_message(&text).await
    }
}
