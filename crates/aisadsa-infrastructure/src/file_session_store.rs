//! File-backed `SessionStore` implementation.
//!
//! Each namespace of a tab session is one JSON object file:
//! `<root>/tabs/<tab-id>/<namespace>.json`.

use crate::atomic_json::AtomicJsonFile;
use aisadsa_core::error::{AssessmentError, Result};
use aisadsa_core::store::SessionStore;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

type Slots = BTreeMap<String, String>;

/// A `SessionStore` persisting one namespace of one tab session.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    namespace: String,
    file: AtomicJsonFile<Slots>,
}

impl FileSessionStore {
    /// Creates a store for `namespace` inside `tab_dir`.
    pub fn new(tab_dir: impl AsRef<Path>, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let path = tab_dir.as_ref().join(format!("{}.json", namespace));
        Self {
            namespace,
            file: AtomicJsonFile::new(path).discard_unreadable(),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    fn slots(&self) -> Result<Slots> {
        Ok(self.file.load()?.unwrap_or_default())
    }
}

impl SessionStore for FileSessionStore {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.file.update(Slots::new(), |slots| {
            slots.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        if !self.file.path().exists() {
            return Ok(());
        }
        self.file.update(Slots::new(), |slots| {
            slots.remove(key);
        })
    }

    fn clear(&self) -> Result<()> {
        debug!("Clearing session namespace '{}'", self.namespace);
        self.file.remove()
    }
}

/// Lists the tab ids that have a session directory under `tabs_dir`.
pub fn list_tabs(tabs_dir: &Path) -> Result<Vec<String>> {
    if !tabs_dir.exists() {
        return Ok(Vec::new());
    }
    let mut tabs: Vec<String> = fs::read_dir(tabs_dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .collect();
    tabs.sort();
    Ok(tabs)
}

/// Generates an id for a fresh tab session.
pub fn new_tab_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Tab ids become directory names, so only `[A-Za-z0-9_-]` is accepted.
pub fn validate_tab_id(tab_id: &str) -> Result<()> {
    let valid = !tab_id.is_empty()
        && tab_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(AssessmentError::config(format!("Invalid tab id '{}'", tab_id)))
    }
}

/// Removes a tab session directory and everything in it.
pub fn remove_tab(tabs_dir: &Path, tab_id: &str) -> Result<()> {
    validate_tab_id(tab_id)?;
    match fs::remove_dir_all(tabs_dir.join(tab_id)) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aisadsa_core::store::{CHAT_NAMESPACE, FLOW_NAMESPACE};
    use tempfile::TempDir;

    #[test]
    fn test_set_get_remove() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path(), FLOW_NAMESPACE);

        assert_eq!(store.get("currentQuestionKey").unwrap(), None);
        store.set("currentQuestionKey", "q2").unwrap();
        store.set("remainingQuestionCount", "12").unwrap();
        assert_eq!(
            store.get("currentQuestionKey").unwrap().as_deref(),
            Some("q2")
        );

        store.remove("currentQuestionKey").unwrap();
        assert_eq!(store.get("currentQuestionKey").unwrap(), None);
        assert_eq!(
            store.get("remainingQuestionCount").unwrap().as_deref(),
            Some("12")
        );
        assert!(store.path().ends_with("flow.json"));
    }

    #[test]
    fn test_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        FileSessionStore::new(temp_dir.path(), FLOW_NAMESPACE)
            .set("currentQuestionKey", "q7")
            .unwrap();

        let reopened = FileSessionStore::new(temp_dir.path(), FLOW_NAMESPACE);
        assert_eq!(
            reopened.get("currentQuestionKey").unwrap().as_deref(),
            Some("q7")
        );
    }

    #[test]
    fn test_clear_is_namespace_scoped() {
        let temp_dir = TempDir::new().unwrap();
        let flow = FileSessionStore::new(temp_dir.path(), FLOW_NAMESPACE);
        let chat = FileSessionStore::new(temp_dir.path(), CHAT_NAMESPACE);
        flow.set("currentQuestionKey", "q1").unwrap();
        chat.set("chatMessages", "[]").unwrap();

        flow.clear().unwrap();

        assert_eq!(flow.get("currentQuestionKey").unwrap(), None);
        assert_eq!(chat.get("chatMessages").unwrap().as_deref(), Some("[]"));
        // Clearing twice is fine
        flow.clear().unwrap();
    }

    #[test]
    fn test_garbled_namespace_file_reads_as_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path(), FLOW_NAMESPACE);
        std::fs::write(store.path(), "{\"currentQuestionKey\": ").unwrap();

        assert_eq!(store.get("currentQuestionKey").unwrap(), None);
        store.set("currentQuestionKey", "q1").unwrap();
        assert_eq!(
            store.get("currentQuestionKey").unwrap().as_deref(),
            Some("q1")
        );
    }

    #[test]
    fn test_tabs_are_isolated() {
        let temp_dir = TempDir::new().unwrap();
        let tabs = temp_dir.path().join("tabs");
        let first = FileSessionStore::new(tabs.join("one"), FLOW_NAMESPACE);
        let second = FileSessionStore::new(tabs.join("two"), FLOW_NAMESPACE);
        first.set("currentQuestionKey", "q1").unwrap();

        assert_eq!(second.get("currentQuestionKey").unwrap(), None);
        assert_eq!(list_tabs(&tabs).unwrap(), vec!["one".to_string()]);

        remove_tab(&tabs, "one").unwrap();
        assert!(list_tabs(&tabs).unwrap().is_empty());
    }

    #[test]
    fn test_tab_id_validation() {
        assert!(validate_tab_id("default").is_ok());
        assert!(validate_tab_id(&new_tab_id()).is_ok());
        assert!(validate_tab_id("").is_err());
        assert!(validate_tab_id("../etc").is_err());
        assert!(validate_tab_id("a/b").is_err());
    }

    #[test]
    fn test_new_tab_ids_are_unique() {
        assert_ne!(new_tab_id(), new_tab_id());
    }
}
