//! Session persistence layer.
//!
//! # Module Structure
//!
//! - `repository`: the `SessionStore` trait (namespaced get/set/remove/clear)
//! - `memory`: in-process implementation
//! - `slots`: typed slot access for the flow and chat namespaces

mod memory;
mod repository;
mod slots;

pub use memory::MemorySessionStore;
pub use repository::SessionStore;
pub use slots::{
    CHAT_TRANSCRIPT_KEY, ChatSlots, FlowSlots, PersistedFlow, QUESTION_KEY_KEY,
    QUESTION_PAYLOAD_KEY, REMAINING_COUNT_KEY,
};

/// Namespace of the question flow's store.
pub const FLOW_NAMESPACE: &str = "flow";
/// Namespace of the chat transcript's store.
pub const CHAT_NAMESPACE: &str = "chat";
