//! Typed access to the named slots each subsystem persists.

use super::repository::SessionStore;
use crate::chat::ChatMessage;
use crate::error::Result;
use crate::question::Question;
use std::sync::Arc;
use tracing::warn;

pub const QUESTION_PAYLOAD_KEY: &str = "currentQuestionData";
pub const QUESTION_KEY_KEY: &str = "currentQuestionKey";
pub const REMAINING_COUNT_KEY: &str = "remainingQuestionCount";
pub const CHAT_TRANSCRIPT_KEY: &str = "chatMessages";

/// The flow's persisted position: what is on screen and how much is left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedFlow {
    pub question_key: String,
    pub question: Question,
    pub remaining: u32,
}

/// Flow-namespace slots: question payload, question key, remaining count.
#[derive(Clone)]
pub struct FlowSlots {
    store: Arc<dyn SessionStore>,
}

impl FlowSlots {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Loads the persisted flow.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(_))`: all three slots present and valid
    /// - `Ok(None)`: flow not started, or the slots were incomplete or
    ///   unreadable (in which case they have been cleared)
    /// - `Err(_)`: the store itself failed
    pub fn load(&self) -> Result<Option<PersistedFlow>> {
        let payload = self.store.get(QUESTION_PAYLOAD_KEY)?;
        let key = self.store.get(QUESTION_KEY_KEY)?;
        let count = self.store.get(REMAINING_COUNT_KEY)?;

        match (payload, key, count) {
            (None, None, None) => Ok(None),
            (Some(payload), Some(key), Some(count)) => {
                let question = serde_json::from_str::<Question>(&payload);
                let remaining = count.trim().parse::<u32>();
                match (question, remaining) {
                    (Ok(question), Ok(remaining)) if !key.is_empty() => Ok(Some(PersistedFlow {
                        question_key: key,
                        question,
                        remaining,
                    })),
                    _ => {
                        warn!("Discarding unreadable flow state in '{}'", self.store.namespace());
                        self.clear()?;
                        Ok(None)
                    }
                }
            }
            _ => {
                warn!("Discarding incomplete flow state in '{}'", self.store.namespace());
                self.clear()?;
                Ok(None)
            }
        }
    }

    /// Writes all three slots.
    ///
    /// The count is written last: it is the slot whose presence marks the
    /// flow as started.
    pub fn save(&self, flow: &PersistedFlow) -> Result<()> {
        let payload = serde_json::to_string(&flow.question)?;
        self.store.set(QUESTION_PAYLOAD_KEY, &payload)?;
        self.store.set(QUESTION_KEY_KEY, &flow.question_key)?;
        self.store.set(REMAINING_COUNT_KEY, &flow.remaining.to_string())
    }

    pub fn save_remaining(&self, remaining: u32) -> Result<()> {
        self.store.set(REMAINING_COUNT_KEY, &remaining.to_string())
    }

    /// Wipes the flow namespace.
    pub fn clear(&self) -> Result<()> {
        self.store.clear()
    }
}

/// Chat-namespace slot: the transcript only.
#[derive(Clone)]
pub struct ChatSlots {
    store: Arc<dyn SessionStore>,
}

impl ChatSlots {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Loads the transcript; empty when absent or unreadable.
    pub fn load(&self) -> Result<Vec<ChatMessage>> {
        let Some(raw) = self.store.get(CHAT_TRANSCRIPT_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(messages) => Ok(messages),
            Err(e) => {
                warn!("Ignoring unreadable chat transcript: {}", e);
                Ok(Vec::new())
            }
        }
    }

    pub fn save(&self, messages: &[ChatMessage]) -> Result<()> {
        let raw = serde_json::to_string(messages)?;
        self.store.set(CHAT_TRANSCRIPT_KEY, &raw)
    }

    pub fn clear(&self) -> Result<()> {
        self.store.clear()
    }
}
