//! Chat subsystem.
//!
//! - `message`: transcript entries (`ChatMessage`, `Sender`)
//! - `session`: the conversation state machine (`ChatSession`)

mod message;
mod session;

pub use message::{CHAT_FAILURE_TEXT, ChatMessage, Sender};
pub use session::{ChatSession, SendOutcome};
