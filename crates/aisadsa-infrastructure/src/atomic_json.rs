//! Atomic JSON file operations.
//!
//! Writes go to a sibling temp file that is fsynced and renamed over the
//! target, so a reader never observes a half-written file. Read-modify-write
//! cycles hold an exclusive lock so two processes sharing a tab do not lose
//! each other's updates.

use aisadsa_core::error::{AssessmentError, Result};
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::warn;

/// A handle to a JSON file holding one `T`.
#[derive(Debug, Clone)]
pub struct AtomicJsonFile<T> {
    path: PathBuf,
    private: bool,
    discard_unreadable: bool,
    _phantom: PhantomData<T>,
}

impl<T> AtomicJsonFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            private: false,
            discard_unreadable: false,
            _phantom: PhantomData,
        }
    }

    /// Restricts the file to its owner (600) on every save. No-op off Unix.
    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }

    /// Treats a file that no longer parses as absent and deletes it, instead
    /// of failing every read and update until someone removes it by hand.
    pub fn discard_unreadable(mut self) -> Self {
        self.discard_unreadable = true;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and deserializes the file.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(T))`: Successfully loaded
    /// - `Ok(None)`: File doesn't exist or is empty, or was unparseable and
    ///   has been discarded
    /// - `Err`: Failed to read the file, or to parse it when unreadable files
    ///   are kept
    pub fn load(&self) -> Result<Option<T>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        match serde_json::from_str(&content) {
            Ok(data) => Ok(Some(data)),
            Err(e) if self.discard_unreadable => {
                warn!("Discarding unreadable {}: {}", self.path.display(), e);
                match fs::remove_file(&self.path) {
                    Ok(()) => Ok(None),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                    Err(e) => Err(e.into()),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Serializes and writes atomically.
    pub fn save(&self, data: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(data)?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        if self.private {
            restrict_to_owner(&tmp_path)?;
        }
        tmp_file.write_all(json.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Read-modify-write under an exclusive lock.
    ///
    /// `default_value` is used when the file does not exist yet.
    pub fn update<F>(&self, default_value: T, f: F) -> Result<()>
    where
        F: FnOnce(&mut T),
    {
        let _lock = FileLock::acquire(&self.path)?;
        let mut data = self.load()?.unwrap_or(default_value);
        f(&mut data);
        self.save(&data)
    }

    /// Deletes the file. Deleting a missing file is not an error.
    pub fn remove(&self) -> Result<()> {
        let _lock = FileLock::acquire(&self.path)?;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| AssessmentError::storage("Path has no parent directory"))?;
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| AssessmentError::storage("Path has no file name"))?;
        Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
    }
}

#[cfg(unix)]
fn restrict_to_owner(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_to_owner(_path: &Path) -> Result<()> {
    Ok(())
}

/// Exclusive lock guard; released when dropped.
struct FileLock {
    _file: File,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self> {
        let lock_path = path.with_extension("lock");
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive().map_err(|e| {
                AssessmentError::storage(format!("Failed to acquire lock: {}", e))
            })?;
        }

        Ok(Self { _file: file })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicJsonFile::<Sample>::new(temp_dir.path().join("nested/sample.json"));

        let sample = Sample {
            name: "test".to_string(),
            count: 42,
        };
        file.save(&sample).unwrap();

        assert_eq!(file.load().unwrap(), Some(sample));
        assert!(!temp_dir.path().join("nested/.sample.json.tmp").exists());
    }

    #[test]
    fn test_load_missing_or_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sample.json");
        let file = AtomicJsonFile::<Sample>::new(path.clone());
        assert_eq!(file.load().unwrap(), None);

        std::fs::write(&path, "  \n").unwrap();
        assert_eq!(file.load().unwrap(), None);
    }

    #[test]
    fn test_garbled_file_is_storage_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sample.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = AtomicJsonFile::<Sample>::new(path).load().unwrap_err();
        assert!(matches!(err, AssessmentError::Storage(_)));
    }

    #[test]
    fn test_garbled_file_is_discarded_when_asked() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("slots.json");
        std::fs::write(&path, "{not json").unwrap();
        let file =
            AtomicJsonFile::<BTreeMap<String, String>>::new(path.clone()).discard_unreadable();

        assert_eq!(file.load().unwrap(), None);
        assert!(!path.exists());

        std::fs::write(&path, "[1,").unwrap();
        file.update(BTreeMap::new(), |map| {
            map.insert("a".into(), "1".into());
        })
        .unwrap();
        assert_eq!(file.load().unwrap().unwrap().len(), 1);
    }

    #[test]
    fn test_update_and_remove() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("slots.json");
        let file = AtomicJsonFile::<BTreeMap<String, String>>::new(path.clone());

        file.update(BTreeMap::new(), |map| {
            map.insert("a".into(), "1".into());
        })
        .unwrap();
        file.update(BTreeMap::new(), |map| {
            map.insert("b".into(), "2".into());
        })
        .unwrap();
        assert_eq!(file.load().unwrap().unwrap().len(), 2);

        file.remove().unwrap();
        assert!(!path.exists());
        file.remove().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_private_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("secret.json");
        let file = AtomicJsonFile::<Sample>::new(path.clone()).private();
        file.save(&Sample {
            name: "s".into(),
            count: 1,
        })
        .unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
