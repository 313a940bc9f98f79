use super::repository::SessionStore;
use crate::error::{AssessmentError, Result};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// In-process [`SessionStore`].
///
/// Clones share the same slots, which lets a test hand one handle to a
/// component and inspect the stored values through another.
#[derive(Debug, Clone)]
pub struct MemorySessionStore {
    namespace: String,
    slots: Arc<RwLock<HashMap<String, String>>>,
}

impl MemorySessionStore {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            slots: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of slots currently held.
    pub fn len(&self) -> usize {
        self.slots.read().map(|slots| slots.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> AssessmentError {
    AssessmentError::storage("memory store lock poisoned")
}

impl SessionStore for MemorySessionStore {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let slots = self.slots.read().map_err(|_| poisoned())?;
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut slots = self.slots.write().map_err(|_| poisoned())?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut slots = self.slots.write().map_err(|_| poisoned())?;
        slots.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut slots = self.slots.write().map_err(|_| poisoned())?;
        slots.clear();
        Ok(())
    }
}
