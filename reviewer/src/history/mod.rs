//! Per-identity review history
//!
//! Each identity owns one bounded, append-only log of [`ReviewRecord`]s,
//! persisted as a JSON array under a single key in the identity's namespace.
//!
//! Logs are loaded from the backend on first access and cached. Every
//! identity has a writer mutex and a committed snapshot. A caller holding a
//! [`HistoryGuard`] can read, await slow work, and append without another
//! writer for the same identity slipping in between. Readers only touch the
//! committed snapshot, so they never wait on an in-flight writer.

mod types;

pub use types::ReviewRecord;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::db::KvStore;
use crate::error::StorageError;

/// Maximum number of records retained per identity
pub const MAX_HISTORY: usize = 50;

/// Identity used when a request names no user
pub const DEFAULT_IDENTITY: &str = "default";

/// Backend key holding an identity's log
const HISTORY_KEY: &str = "history";

/// Writer lock and committed log for one identity
#[derive(Clone, Default)]
struct Slot {
    writer: Arc<Mutex<()>>,
    /// `None` until loaded from the backend
    committed: Arc<RwLock<Option<Vec<ReviewRecord>>>>,
}

/// Durable per-identity history store
#[derive(Clone)]
pub struct HistoryStore {
    backend: Arc<dyn KvStore>,
    slots: Arc<Mutex<HashMap<String, Slot>>>,
    max_history: usize,
}

impl HistoryStore {
    /// Create a store over the given backend, retaining [`MAX_HISTORY`] records
    pub fn new(backend: Arc<dyn KvStore>) -> Self {
        Self {
            backend,
            slots: Arc::new(Mutex::new(HashMap::new())),
            max_history: MAX_HISTORY,
        }
    }

    /// Override the retention cap (minimum 1)
    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history.max(1);
        self
    }

    /// Retention cap in effect
    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// Acquire exclusive write access to an identity's log, loading it if needed.
    ///
    /// The guard must be held for the whole read-modify-write sequence;
    /// dropping it releases the identity for the next writer. Readers are
    /// not blocked by the guard.
    pub async fn lock(&self, identity: &str) -> Result<HistoryGuard, StorageError> {
        let slot = self.slot(identity).await;
        let writer = slot.writer.clone().lock_owned().await;
        let records = self.committed(identity, &slot).await?;

        Ok(HistoryGuard {
            identity: identity.to_string(),
            backend: self.backend.clone(),
            max_history: self.max_history,
            records,
            committed: slot.committed,
            _writer: writer,
        })
    }

    /// Get the committed log for an identity, oldest first. Unknown identities are empty.
    pub async fn read(&self, identity: &str) -> Result<Vec<ReviewRecord>, StorageError> {
        let slot = self.slot(identity).await;
        if let Some(records) = slot.committed.read().await.as_ref() {
            return Ok(records.clone());
        }

        // First access loads under the writer lock so only one caller hits the backend
        let _writer = slot.writer.lock().await;
        self.committed(identity, &slot).await
    }

    /// Append a record and persist the truncated log
    pub async fn append(&self, identity: &str, record: ReviewRecord) -> Result<(), StorageError> {
        let mut guard = self.lock(identity).await?;
        guard.append(record).await
    }

    async fn slot(&self, identity: &str) -> Slot {
        let mut slots = self.slots.lock().await;
        slots.entry(identity.to_string()).or_default().clone()
    }

    /// Committed log, loading it on a miss. Callers hold the slot's writer lock.
    async fn committed(&self, identity: &str, slot: &Slot) -> Result<Vec<ReviewRecord>, StorageError> {
        if let Some(records) = slot.committed.read().await.as_ref() {
            return Ok(records.clone());
        }

        let records = self.load(identity).await?;
        tracing::debug!("Loaded {} history records for {}", records.len(), identity);
        *slot.committed.write().await = Some(records.clone());
        Ok(records)
    }

    async fn load(&self, identity: &str) -> Result<Vec<ReviewRecord>, StorageError> {
        match self.backend.get(identity, HISTORY_KEY).await? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(Vec::new()),
        }
    }
}

/// Exclusive write handle on one identity's log
pub struct HistoryGuard {
    identity: String,
    backend: Arc<dyn KvStore>,
    max_history: usize,
    records: Vec<ReviewRecord>,
    committed: Arc<RwLock<Option<Vec<ReviewRecord>>>>,
    _writer: OwnedMutexGuard<()>,
}

impl HistoryGuard {
    /// Identity this guard belongs to
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Committed records, oldest first
    pub fn records(&self) -> &[ReviewRecord] {
        &self.records
    }

    /// Number of committed records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the identity has no committed records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append `record`, drop the oldest entries beyond the cap, then persist.
    ///
    /// The committed log only changes after the backend accepts the write, so
    /// a failed persist leaves the log exactly as it was.
    pub async fn append(&mut self, record: ReviewRecord) -> Result<(), StorageError> {
        let mut next = Vec::with_capacity(self.len() + 1);
        next.extend_from_slice(&self.records);
        next.push(record);

        if next.len() > self.max_history {
            let overflow = next.len() - self.max_history;
            next.drain(..overflow);
        }

        let bytes = serde_json::to_vec(&next)?;
        self.backend.put(&self.identity, HISTORY_KEY, bytes).await?;

        *self.committed.write().await = Some(next.clone());
        self.records = next;
        Ok(())
    }
}
