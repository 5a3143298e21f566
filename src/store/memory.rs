//! In-memory task store.
//!
//! ## Limitations
//!
//! - **No durability**: `sync` only counts calls
//! - **Single session at a time**: opening a second session on the same thread
//!   while one is alive deadlocks
//! - **Whole-store lock**: the update lock of a session covers every record,
//!   the per-record lock set only guards `set_state`

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use super::{RecordId, Session, TaskRecord, TaskStore};
use crate::error::{Error, Result};
use crate::model::{State, WorkKey, Workload};

/// In-memory store for tests and simulations.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: Mutex<HashMap<RecordId, TaskRecord>>,
    commits: AtomicU64,
    rollbacks: AtomicU64,
    syncs: AtomicU64,
}

/// Converts a lock poison error to a storage error.
fn poison_err<T>(_: PoisonError<T>) -> Error {
    Error::Storage("task store lock poisoned".to_string())
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record outside of any session.
    pub fn insert(&self, record: TaskRecord) -> Result<()> {
        let mut records = self.records.lock().map_err(poison_err)?;
        records.insert(record.id.clone(), record);
        Ok(())
    }

    /// Insert a queued record for a workload.
    pub fn seed(&self, workload: &Workload) -> Result<()> {
        self.insert(TaskRecord::for_workload(workload))
    }

    /// Read the committed record for `key`, if any.
    pub fn get(&self, key: &WorkKey) -> Result<Option<TaskRecord>> {
        let records = self.records.lock().map_err(poison_err)?;
        Ok(records.get(&RecordId::from(key)).cloned())
    }

    /// Committed state for `key`.
    pub fn state_of(&self, key: &WorkKey) -> Result<Option<State>> {
        Ok(self.get(key)?.and_then(|r| r.state))
    }

    pub fn record_count(&self) -> Result<usize> {
        let records = self.records.lock().map_err(poison_err)?;
        Ok(records.len())
    }

    pub fn commit_count(&self) -> u64 {
        self.commits.load(Ordering::Relaxed)
    }

    pub fn rollback_count(&self) -> u64 {
        self.rollbacks.load(Ordering::Relaxed)
    }

    pub fn sync_count(&self) -> u64 {
        self.syncs.load(Ordering::Relaxed)
    }
}

impl TaskStore for InMemoryStore {
    fn begin(&self) -> Result<Box<dyn Session + '_>> {
        let records = self.records.lock().map_err(poison_err)?;
        let id = Uuid::new_v4();
        debug!(session_id = %id, "session opened");
        Ok(Box::new(MemorySession {
            id,
            records,
            staged: HashMap::new(),
            locked: HashSet::new(),
            committed: false,
            store: self,
        }))
    }

    fn sync(&self) -> Result<()> {
        let n = self.syncs.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(syncs = n, "store synced");
        Ok(())
    }
}

/// Session over an [`InMemoryStore`]. Holds the store lock until dropped.
struct MemorySession<'a> {
    id: Uuid,
    records: MutexGuard<'a, HashMap<RecordId, TaskRecord>>,
    staged: HashMap<RecordId, TaskRecord>,
    locked: HashSet<RecordId>,
    committed: bool,
    store: &'a InMemoryStore,
}

impl Session for MemorySession<'_> {
    fn id(&self) -> Uuid {
        self.id
    }

    fn get_for_update(&mut self, key: &WorkKey) -> Result<TaskRecord> {
        let id = RecordId::from(key);
        let record = self
            .staged
            .get(&id)
            .or_else(|| self.records.get(&id))
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("task record {id}")))?;
        self.locked.insert(id);
        Ok(record)
    }

    fn set_state(&mut self, record: &mut TaskRecord, state: State) -> Result<()> {
        if !self.locked.contains(&record.id) {
            return Err(Error::NotLocked(record.id.to_string()));
        }
        record.state = Some(state);
        record.updated_at = Some(Utc::now());
        self.staged.insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn commit(mut self: Box<Self>) -> Result<()> {
        let staged = std::mem::take(&mut self.staged);
        let writes = staged.len();
        self.records.extend(staged);
        self.committed = true;
        self.store.commits.fetch_add(1, Ordering::Relaxed);
        debug!(session_id = %self.id, writes, "session committed");
        Ok(())
    }
}

impl Drop for MemorySession<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.store.rollbacks.fetch_add(1, Ordering::Relaxed);
            debug!(
                session_id = %self.id,
                discarded = self.staged.len(),
                "session rolled back"
            );
        }
    }
}
