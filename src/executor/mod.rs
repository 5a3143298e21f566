//! Executors: the scheduler seam between an orchestrator and whatever runs
//! its work.
//!
//! An orchestrator talks to an executor only through [`Executor`]. Which
//! implementation it gets is decided by configuration via [`loader`].

pub mod base;
pub mod ledger;
pub mod loader;
pub mod mock;
pub mod outcome;
pub mod stubs;

use std::collections::BTreeMap;

use secrecy::SecretString;

use crate::error::Result;
use crate::model::{State, WorkKey, Workload};

pub use base::BaseExecutor;
pub use ledger::{HistoryLog, Ledger};
pub use loader::ExecutorKind;
pub use mock::MockExecutor;
pub use outcome::OutcomeRegistry;
pub use stubs::{CallbackRequest, CallbackSink, StubCallbackSink, StubTokenIssuer, TokenIssuer};

/// Default capacity when none is configured.
pub const DEFAULT_PARALLELISM: usize = 32;

/// Buffered `(state, info)` per key, drained by [`Executor::get_event_buffer`].
pub type EventBuffer = BTreeMap<WorkKey, (State, Option<String>)>;

/// How an executor is addressed in configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorName {
    pub module_path: String,
    pub alias: String,
}

impl ExecutorName {
    pub fn new(module_path: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            module_path: module_path.into(),
            alias: alias.into(),
        }
    }

    /// Does `name` refer to this executor?
    pub fn matches(&self, name: &str) -> bool {
        name == self.module_path || name == self.alias
    }
}

impl std::fmt::Display for ExecutorName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.alias, self.module_path)
    }
}

/// Settings shared by every executor implementation.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum number of concurrently running work items.
    pub parallelism: usize,
    /// When false, heartbeats do nothing.
    pub do_update: bool,
    /// Token handed out for workloads.
    pub token: SecretString,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            parallelism: DEFAULT_PARALLELISM,
            do_update: true,
            token: SecretString::from(stubs::DEFAULT_CANNED_TOKEN),
        }
    }
}

/// The scheduler interface.
pub trait Executor: Send {
    fn name(&self) -> &ExecutorName;

    /// Add a workload to the pending set.
    fn queue_workload(&mut self, workload: Workload) -> Result<()>;

    /// Hand a batch of workloads to the executor's own processing. Admission
    /// never happens here.
    fn process_workloads(&mut self, workloads: Vec<Workload>) -> Result<()>;

    /// Run one scheduling cycle.
    fn heartbeat(&mut self) -> Result<()>;

    /// Stop accepting work. Does not imply `end`.
    fn terminate(&mut self);

    /// Flush and shut down.
    fn end(&mut self) -> Result<()>;

    /// Make buffered state changes durable.
    fn sync(&mut self) -> Result<()>;

    /// Number of workloads still pending.
    fn queued_count(&self) -> usize;

    /// Number of workloads occupying a slot.
    fn running_count(&self) -> usize;

    /// Drain buffered events, restricted to `owner_ids` when given.
    fn get_event_buffer(&mut self, owner_ids: Option<&[&str]>) -> EventBuffer;

    /// Deliver a callback request to the executor's callback sink.
    fn send_callback(&mut self, request: CallbackRequest) -> Result<()>;
}
