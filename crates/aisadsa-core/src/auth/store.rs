//! Credential store traits.

use super::model::Credentials;
use crate::error::{AssessmentError, Result};
use std::sync::{Arc, RwLock};

/// Read side of the credential store, all the flow and chat ever need.
pub trait CredentialSource: Send + Sync {
    /// The credential of the signed-in user, if any.
    fn current(&self) -> Option<Credentials>;

    fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }
}

/// Long-lived credential storage, written at sign-in and wiped at logout.
pub trait CredentialStore: CredentialSource {
    fn save(&self, credentials: &Credentials) -> Result<()>;

    fn clear(&self) -> Result<()>;
}

/// In-process [`CredentialStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    credentials: Arc<RwLock<Option<Credentials>>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that starts signed in.
    pub fn signed_in(credentials: Credentials) -> Self {
        Self {
            credentials: Arc::new(RwLock::new(Some(credentials))),
        }
    }
}

impl CredentialSource for MemoryCredentialStore {
    fn current(&self) -> Option<Credentials> {
        self.credentials.read().ok().and_then(|guard| guard.clone())
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn save(&self, credentials: &Credentials) -> Result<()> {
        let mut guard = self
            .credentials
            .write()
            .map_err(|_| AssessmentError::storage("credential lock poisoned"))?;
        *guard = Some(credentials.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self
            .credentials
            .write()
            .map_err(|_| AssessmentError::storage("credential lock poisoned"))?;
        *guard = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_clear() {
        let store = MemoryCredentialStore::new();
        assert!(!store.is_authenticated());

        store
            .save(&Credentials {
                access_token: "t".to_string(),
                refresh_token: String::new(),
                username: "ada".to_string(),
                email: String::new(),
                name: String::new(),
            })
            .unwrap();
        assert_eq!(store.current().unwrap().username, "ada");

        store.clear().unwrap();
        assert!(store.current().is_none());
    }
}
