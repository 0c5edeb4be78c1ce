//! Pending lead queue
//!
//! Leads that could not be delivered are kept as a JSON array under a single
//! key of a key-value store (browser `localStorage`, a directory of files, or
//! memory). Every entry carries a generated id so that removal never depends
//! on its position in the array.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::lead::LeadPayload;

/// Storage key the queue is kept under
pub const DEFAULT_STORAGE_KEY: &str = "g2gi_pending_leads";

/// Key-value storage error
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to read key '{key}': {reason}")]
    Read { key: String, reason: String },

    #[error("Failed to write key '{key}': {reason}")]
    Write { key: String, reason: String },
}

/// String key-value storage with `localStorage` semantics
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store, lost when dropped
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self
            .items
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self
            .items
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Queue error types
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Stored queue under '{key}' could not be parsed: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode queue: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Queue lock poisoned")]
    Poisoned,
}

/// Status of a queued lead. Entries never leave this state; they are removed instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PendingStatus {
    #[default]
    Pending,
}

/// A lead waiting to be resent
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingEntry {
    pub id: Uuid,
    #[serde(flatten)]
    pub payload: LeadPayload,
    pub saved_at: DateTime<Utc>,
    pub status: PendingStatus,
}

/// Entry as found in storage. Entries written before ids existed have none.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredEntry {
    #[serde(default)]
    id: Option<Uuid>,
    #[serde(flatten)]
    payload: LeadPayload,
    saved_at: DateTime<Utc>,
    #[serde(default)]
    status: PendingStatus,
}

impl StoredEntry {
    fn into_entry(self) -> PendingEntry {
        PendingEntry {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            payload: self.payload,
            saved_at: self.saved_at,
            status: self.status,
        }
    }
}

impl PendingEntry {
    pub fn new(payload: LeadPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            payload,
            saved_at: Utc::now(),
            status: PendingStatus::Pending,
        }
    }
}

/// Backup queue for undelivered leads
pub trait PendingQueue {
    /// Append a payload and return the stored entry
    fn enqueue(&self, payload: LeadPayload) -> Result<PendingEntry, QueueError>;

    /// Snapshot of every queued entry, oldest first. Nothing is removed.
    fn dequeue_all(&self) -> Result<Vec<PendingEntry>, QueueError>;

    /// Remove the entry with the given id. Returns whether it was present.
    fn remove(&self, id: Uuid) -> Result<bool, QueueError>;
}

impl<Q: PendingQueue + ?Sized> PendingQueue for Arc<Q> {
    fn enqueue(&self, payload: LeadPayload) -> Result<PendingEntry, QueueError> {
        (**self).enqueue(payload)
    }

    fn dequeue_all(&self) -> Result<Vec<PendingEntry>, QueueError> {
        (**self).dequeue_all()
    }

    fn remove(&self, id: Uuid) -> Result<bool, QueueError> {
        (**self).remove(id)
    }
}

/// `PendingQueue` persisted as one JSON array in a `KeyValueStore`
#[derive(Debug)]
pub struct StoredQueue<S> {
    store: S,
    key: String,
    // Serializes read-modify-write cycles on the stored array
    guard: Mutex<()>,
}

impl<S: KeyValueStore> StoredQueue<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read the stored array. Must be called with `guard` held.
    ///
    /// Entries stored without an id get one assigned, and the array is written
    /// back right away so the ids stay stable for `remove`.
    fn load(&self) -> Result<Vec<PendingEntry>, QueueError> {
        let Some(raw) = self.store.get_item(&self.key)? else {
            return Ok(Vec::new());
        };

        let stored: Vec<StoredEntry> =
            serde_json::from_str(&raw).map_err(|source| QueueError::Malformed {
                key: self.key.clone(),
                source,
            })?;

        let missing_ids = stored.iter().filter(|entry| entry.id.is_none()).count();
        let entries: Vec<PendingEntry> = stored.into_iter().map(StoredEntry::into_entry).collect();

        if missing_ids > 0 {
            self.save(&entries)?;
            tracing::info!(count = missing_ids, key = %self.key, "Assigned ids to queued leads");
        }
        Ok(entries)
    }

    fn save(&self, entries: &[PendingEntry]) -> Result<(), QueueError> {
        let raw = serde_json::to_string(entries).map_err(QueueError::Encode)?;
        self.store.set_item(&self.key, &raw)?;
        Ok(())
    }
}

impl<S: KeyValueStore> PendingQueue for StoredQueue<S> {
    fn enqueue(&self, payload: LeadPayload) -> Result<PendingEntry, QueueError> {
        let _lock = self.guard.lock().map_err(|_| QueueError::Poisoned)?;

        let mut entries = self.load()?;
        let entry = PendingEntry::new(payload);
        entries.push(entry.clone());
        self.save(&entries)?;

        tracing::debug!(id = %entry.id, queued = entries.len(), "Lead saved to pending queue");
        Ok(entry)
    }

    fn dequeue_all(&self) -> Result<Vec<PendingEntry>, QueueError> {
        let _lock = self.guard.lock().map_err(|_| QueueError::Poisoned)?;
        self.load()
    }

    fn remove(&self, id: Uuid) -> Result<bool, QueueError> {
        let _lock = self.guard.lock().map_err(|_| QueueError::Poisoned)?;

        let mut entries = self.load()?;
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        if entries.len() == before {
            return Ok(false);
        }

        self.save(&entries)?;
        Ok(true)
    }
}
