//! Append-only records kept for replay assertions.

use serde::Serialize;

use crate::model::{State, Transition, WorkKey, Workload};

/// Every state change applied by an executor, in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Ledger {
    entries: Vec<Transition>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, key: WorkKey, state: State, info: Option<String>) {
        self.entries.push(Transition { key, state, info });
    }

    pub fn entries(&self) -> &[Transition] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in the order they were transitioned.
    pub fn keys(&self) -> impl Iterator<Item = &WorkKey> {
        self.entries.iter().map(|t| &t.key)
    }
}

/// Pending-set snapshots, one per heartbeat, taken before selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct HistoryLog {
    snapshots: Vec<Vec<Workload>>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, snapshot: Vec<Workload>) {
        self.snapshots.push(snapshot);
    }

    pub fn snapshots(&self) -> &[Vec<Workload>] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
