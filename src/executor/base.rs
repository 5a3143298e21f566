//! Shared dispatch substrate: pending set, running set, capacity and the
//! state-change primitive every executor reports through.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::EventBuffer;
use crate::error::{Error, Result};
use crate::model::{State, WorkKey, Workload};

/// Bookkeeping common to all executors.
///
/// Invariant: a key is never in both `pending` and `running`.
#[derive(Debug)]
pub struct BaseExecutor {
    pending: BTreeMap<WorkKey, Workload>,
    running: BTreeSet<WorkKey>,
    capacity: usize,
    event_buffer: EventBuffer,
}

impl BaseExecutor {
    pub fn new(capacity: usize) -> Self {
        Self {
            pending: BTreeMap::new(),
            running: BTreeSet::new(),
            capacity,
            event_buffer: BTreeMap::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Pending workloads, keyed by work key.
    pub fn pending(&self) -> &BTreeMap<WorkKey, Workload> {
        &self.pending
    }

    pub fn running(&self) -> &BTreeSet<WorkKey> {
        &self.running
    }

    pub fn queued_count(&self) -> usize {
        self.pending.len()
    }

    pub fn running_count(&self) -> usize {
        self.running.len()
    }

    /// Capacity not taken by running or pending work.
    pub fn slots_available(&self) -> usize {
        self.capacity
            .saturating_sub(self.running.len())
            .saturating_sub(self.pending.len())
    }

    /// Slots free for admission this cycle. Pending work does not count.
    pub fn open_slots(&self) -> usize {
        self.capacity.saturating_sub(self.running.len())
    }

    /// Is the key pending or running?
    pub fn has_task(&self, key: &WorkKey) -> bool {
        self.pending.contains_key(key) || self.running.contains(key)
    }

    /// Add a workload to the pending set.
    pub fn queue_workload(&mut self, workload: Workload) -> Result<()> {
        if self.has_task(&workload.key) {
            return Err(Error::DuplicateKey(workload.key.to_string()));
        }
        debug!(key = %workload.key, priority = workload.effective_priority(), "workload queued");
        self.pending.insert(workload.key.clone(), workload);
        Ok(())
    }

    /// Remove a workload from the pending set.
    pub fn take_pending(&mut self, key: &WorkKey) -> Option<Workload> {
        self.pending.remove(key)
    }

    /// Move a pending key into the running set.
    pub fn start_running(&mut self, key: &WorkKey) -> Result<()> {
        if self.pending.remove(key).is_none() {
            return Err(Error::NotFound(format!("pending workload {key}")));
        }
        self.running.insert(key.clone());
        Ok(())
    }

    /// Record a state change for `key`.
    ///
    /// With `remove_running` the key is expected to be running and a miss is
    /// logged; without it the key is dropped from the running set if present.
    pub fn change_state(
        &mut self,
        key: &WorkKey,
        state: State,
        info: Option<String>,
        remove_running: bool,
    ) {
        let removed = self.running.remove(key);
        if remove_running && !removed {
            debug!(key = %key, "could not find key in running set");
        }
        self.event_buffer.insert(key.clone(), (state, info));
    }

    /// Drain buffered events, restricted to `owner_ids` when given.
    pub fn get_event_buffer(&mut self, owner_ids: Option<&[&str]>) -> EventBuffer {
        match owner_ids {
            None => std::mem::take(&mut self.event_buffer),
            Some(owners) => {
                let (matched, kept): (EventBuffer, EventBuffer) = std::mem::take(&mut self.event_buffer)
                    .into_iter()
                    .partition(|(key, _)| owners.contains(&key.owner_id.as_str()));
                self.event_buffer = kept;
                matched
            }
        }
    }
}
