//! File-backed credential store (`credentials.json` in the config dir).

use crate::atomic_json::AtomicJsonFile;
use aisadsa_core::auth::{CredentialSource, CredentialStore, Credentials};
use aisadsa_core::error::{AssessmentError, Result};
use std::path::PathBuf;
use std::sync::RwLock;
use tracing::{info, warn};

/// Long-lived credential storage that survives tab sessions.
///
/// The file is read once at construction and cached; every write goes
/// through to disk with owner-only permissions.
///
/// # Security Note
///
/// Tokens are stored as plaintext JSON protected only by file permissions.
pub struct FileCredentialStore {
    file: AtomicJsonFile<Credentials>,
    cached: RwLock<Option<Credentials>>,
}

impl FileCredentialStore {
    /// Opens the store. An unreadable file is treated as signed out.
    pub fn open(path: PathBuf) -> Self {
        let file = AtomicJsonFile::new(path).private();
        let cached = match file.load() {
            Ok(credentials) => credentials,
            Err(e) => {
                warn!(
                    "Ignoring unreadable credentials at {}: {}",
                    file.path().display(),
                    e
                );
                None
            }
        };
        Self {
            file,
            cached: RwLock::new(cached),
        }
    }

    fn write_cache(&self, value: Option<Credentials>) -> Result<()> {
        let mut guard = self
            .cached
            .write()
            .map_err(|_| AssessmentError::storage("credential lock poisoned"))?;
        *guard = value;
        Ok(())
    }
}

impl CredentialSource for FileCredentialStore {
    fn current(&self) -> Option<Credentials> {
        self.cached.read().ok().and_then(|guard| guard.clone())
    }
}

impl CredentialStore for FileCredentialStore {
    fn save(&self, credentials: &Credentials) -> Result<()> {
        self.file.save(credentials)?;
        self.write_cache(Some(credentials.clone()))?;
        info!("Saved credentials for '{}'", credentials.username);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.write_cache(None)?;
        self.file.remove()?;
        info!("Cleared stored credentials");
        Ok(())
    }
}

impl std::fmt::Debug for FileCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileCredentialStore")
            .field("path", &self.file.path())
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn credentials() -> Credentials {
        Credentials {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
        }
    }

    #[test]
    fn test_save_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.json");

        let store = FileCredentialStore::open(path.clone());
        assert!(!store.is_authenticated());
        store.save(&credentials()).unwrap();

        let reopened = FileCredentialStore::open(path);
        assert_eq!(reopened.current(), Some(credentials()));
    }

    #[test]
    fn test_file_uses_wire_field_names() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.json");
        FileCredentialStore::open(path.clone())
            .save(&credentials())
            .unwrap();

        let raw = std::fs::read_to_string(path).unwrap();
        assert!(raw.contains("\"accessToken\""));
        assert!(raw.contains("\"refreshToken\""));
    }

    #[test]
    fn test_clear_removes_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.json");
        let store = FileCredentialStore::open(path.clone());
        store.save(&credentials()).unwrap();

        store.clear().unwrap();

        assert!(!store.is_authenticated());
        assert!(!path.exists());
        assert!(!FileCredentialStore::open(path).is_authenticated());
    }

    #[test]
    fn test_garbled_file_is_signed_out() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.json");
        std::fs::write(&path, "{\"accessToken\":").unwrap();

        assert!(!FileCredentialStore::open(path).is_authenticated());
    }

    #[test]
    fn test_debug_hides_tokens() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCredentialStore::open(temp_dir.path().join("credentials.json"));
        store.save(&credentials()).unwrap();
        let rendered = format!("{:?}", store);
        assert!(!rendered.contains("access"));
        assert!(rendered.contains("authenticated: true"));
    }
}
