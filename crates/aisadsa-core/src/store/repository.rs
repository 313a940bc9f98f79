//! Session store trait.
//!
//! Defines the key/value interface that backs tab-scoped session state.

use crate::error::Result;

/// A tab-scoped key/value store over named slots.
///
/// Each subsystem receives its own instance bound to a namespace, so
/// [`SessionStore::clear`] on the flow store never touches the chat
/// transcript and vice versa.
///
/// # Implementation Notes
///
/// Writes must be durable by the time `set`/`remove` return: callers rely on
/// every mutation surviving a reload.
pub trait SessionStore: Send + Sync {
    /// Namespace this instance is bound to (e.g. `"flow"`, `"chat"`).
    fn namespace(&self) -> &str;

    /// Reads a slot.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(value))`: Slot present
    /// - `Ok(None)`: Slot absent
    /// - `Err(_)`: Storage could not be read
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes a slot, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes a slot. Removing an absent slot is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Removes every slot in this namespace.
    fn clear(&self) -> Result<()>;
}
