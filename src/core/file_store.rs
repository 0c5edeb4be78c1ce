//! Directory-backed key-value store
//!
//! Native stand-in for browser `localStorage`: each key is a `<key>.json` file
//! inside one directory. Writes go to a temporary file first and are renamed
//! into place.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::core::queue::{KeyValueStore, StorageError};

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", file_name))
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Read {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let write_error = |e: std::io::Error| StorageError::Write {
            key: key.to_string(),
            reason: e.to_string(),
        };

        fs::create_dir_all(&self.dir).map_err(write_error)?;

        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(write_error)?;
        fs::rename(&tmp, &path).map_err(write_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::queue::{DEFAULT_STORAGE_KEY, PendingQueue, StoredQueue};

    #[test]
    fn test_missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        assert!(store.get_item("absent").unwrap().is_none());
    }

    #[test]
    fn test_set_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));

        store.set_item(DEFAULT_STORAGE_KEY, "[]").unwrap();

        assert_eq!(
            store.get_item(DEFAULT_STORAGE_KEY).unwrap().as_deref(),
            Some("[]")
        );
        assert!(store.path_for(DEFAULT_STORAGE_KEY).exists());
        assert!(!store.path_for(DEFAULT_STORAGE_KEY).with_extension("json.tmp").exists());
    }

    #[test]
    fn test_key_is_sanitized_into_file_name() {
        let store = FileStore::new("/tmp/leads");
        assert_eq!(
            store.path_for("../etc/passwd"),
            PathBuf::from("/tmp/leads/___etc_passwd.json")
        );
    }

    #[test]
    fn test_queue_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let payload = {
            use crate::core::lead::{ClientContext, FormInput, LeadPayload};
            let input = FormInput {
                first_name: "Ana".to_string(),
                last_name: "Ruiz".to_string(),
                email: "ana@x.com".to_string(),
                company: "Acme".to_string(),
                service: "Otro".to_string(),
                ..Default::default()
            };
            LeadPayload::build(&input, &ClientContext::default(), "test", chrono::Utc::now())
        };

        let entry = StoredQueue::new(FileStore::new(dir.path()))
            .enqueue(payload)
            .unwrap();

        let reopened = StoredQueue::new(FileStore::new(dir.path()));
        let entries = reopened.dequeue_all().unwrap();
        assert_eq!(entries, vec![entry]);
    }
}
