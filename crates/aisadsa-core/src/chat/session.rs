use super::message::ChatMessage;
use crate::api::ChatApi;
use crate::auth::CredentialSource;
use crate::error::{Result, ValidationFailure};
use crate::store::{ChatSlots, SessionStore};
use crate::ticket::RequestGate;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

/// What became of a sent message's reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The assistant message (reply or error-marked failure) was appended.
    Replied(ChatMessage),
    /// The chat was detached or cleared while the request was pending; the
    /// reply was dropped.
    Discarded,
}

#[derive(Default)]
struct ChatState {
    messages: Vec<ChatMessage>,
    gate: RequestGate,
}

/// Conversation with the assistant, independent of question-flow progress.
///
/// Every transcript mutation is written through to the chat store before the
/// call that caused it returns, so the transcript survives a reload at any
/// point. At most one send is outstanding.
pub struct ChatSession {
    api: Arc<dyn ChatApi>,
    credentials: Arc<dyn CredentialSource>,
    slots: ChatSlots,
    state: Mutex<ChatState>,
}

impl ChatSession {
    pub fn new(
        api: Arc<dyn ChatApi>,
        credentials: Arc<dyn CredentialSource>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            api,
            credentials,
            slots: ChatSlots::new(store),
            state: Mutex::new(ChatState::default()),
        }
    }

    /// Loads the transcript from the chat store, replacing the in-memory copy.
    ///
    /// # Returns
    ///
    /// The number of messages loaded.
    pub async fn hydrate(&self) -> Result<usize> {
        let messages = self.slots.load()?;
        let mut state = self.state.lock().await;
        state.messages = messages;
        Ok(state.messages.len())
    }

    /// Sends a message and appends exactly one assistant reply.
    ///
    /// # Errors
    ///
    /// Only validation and storage failures are returned as errors: empty
    /// input, a send already in flight, or the user message could not be
    /// persisted. Remote failures become an error-marked assistant message.
    pub async fn send_message(&self, text: &str) -> Result<SendOutcome> {
        if text.trim().is_empty() {
            return Err(ValidationFailure::EmptyMessage.into());
        }

        let ticket = {
            let mut state = self.state.lock().await;
            let ticket = state.gate.issue()?;
            state.messages.push(ChatMessage::user(text));
            if let Err(e) = self.slots.save(&state.messages) {
                state.messages.pop();
                let _ = state.gate.complete(ticket);
                return Err(e);
            }
            ticket
        };

        let reply = match self.credentials.current() {
            Some(credentials) => self.api.ask(&credentials, text).await,
            None => Err(ValidationFailure::NotAuthenticated.into()),
        };

        let mut state = self.state.lock().await;
        if !state.gate.complete(ticket) {
            debug!("Dropping chat reply for a detached session");
            return Ok(SendOutcome::Discarded);
        }

        let message = match reply {
            Ok(text) => ChatMessage::assistant(text),
            Err(e) => {
                warn!("Chat request failed: {}", e);
                ChatMessage::failure()
            }
        };
        state.messages.push(message.clone());
        if let Err(e) = self.slots.save(&state.messages) {
            error!("Failed to persist chat transcript: {}", e);
        }

        Ok(SendOutcome::Replied(message))
    }

    /// A copy of the transcript in append order.
    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.state.lock().await.messages.clone()
    }

    /// Whether a send is in flight.
    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.gate.is_busy()
    }

    /// The owning view went away: a pending reply will be dropped.
    pub async fn detach(&self) {
        self.state.lock().await.gate.invalidate();
    }

    /// Wipes the transcript in memory and in the store.
    pub async fn clear(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        state.gate.invalidate();
        state.messages.clear();
        self.slots.clear()
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession").finish_non_exhaustive()
    }
}
