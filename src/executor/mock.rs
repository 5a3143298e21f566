//! Deterministic mock executor.
//!
//! Nothing is ever executed. Each heartbeat admits a capacity-bounded,
//! priority-ordered prefix of the pending set, writes each admitted item's
//! predetermined outcome to the task store, and records the transition in the
//! ledger. Given the same pending set and the same overrides, two runs produce
//! identical ledgers and histories.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use opentelemetry::KeyValue;
use secrecy::SecretString;
use tracing::{Span, debug};

use super::{
    BaseExecutor, CallbackRequest, CallbackSink, EventBuffer, Executor, ExecutorConfig,
    ExecutorName, HistoryLog, Ledger, OutcomeRegistry, StubCallbackSink, StubTokenIssuer,
    TokenIssuer,
};
use crate::error::Result;
use crate::model::{State, UNMAPPED_FAN_OUT, WorkKey, Workload};
use crate::store::{Session, TaskStore, with_scoped_session};
use crate::telemetry::dispatch::{record_state_transition, start_heartbeat_span};
use crate::telemetry::metrics;

pub const MOCK_MODULE_PATH: &str = "mock.executor.path";
pub const MOCK_ALIAS: &str = "mock_executor";

/// Admission order: priority weight descending, then submission time, owner,
/// item, fan-out index and attempt ascending.
pub fn dispatch_order(a: &Workload, b: &Workload) -> Ordering {
    b.effective_priority()
        .cmp(&a.effective_priority())
        .then_with(|| a.queued_at.cmp(&b.queued_at))
        .then_with(|| a.key.owner_id.cmp(&b.key.owner_id))
        .then_with(|| a.key.item_id.cmp(&b.key.item_id))
        .then_with(|| a.key.fan_out.cmp(&b.key.fan_out))
        .then_with(|| a.key.attempt.cmp(&b.key.attempt))
}

/// Keys of the first `open_slots` pending workloads in admission order.
pub fn select_batch(pending: &BTreeMap<WorkKey, Workload>, open_slots: usize) -> Vec<WorkKey> {
    let mut ordered: Vec<&Workload> = pending.values().collect();
    ordered.sort_by(|a, b| dispatch_order(a, b));
    ordered
        .into_iter()
        .take(open_slots)
        .map(|w| w.key.clone())
        .collect()
}

/// Executor test double with a reproducible admission history.
pub struct MockExecutor {
    name: ExecutorName,
    base: BaseExecutor,
    do_update: bool,
    outcomes: OutcomeRegistry,
    ledger: Ledger,
    history: HistoryLog,
    store: Arc<dyn TaskStore>,
    callback_sink: StubCallbackSink,
    token_issuer: StubTokenIssuer,
}

impl MockExecutor {
    /// Workloads cannot be shipped to another process.
    pub const SUPPORTS_PICKLING: bool = false;

    pub fn new(config: ExecutorConfig, store: Arc<dyn TaskStore>) -> Self {
        Self {
            name: Self::executor_name(),
            base: BaseExecutor::new(config.parallelism),
            do_update: config.do_update,
            outcomes: OutcomeRegistry::new(),
            ledger: Ledger::new(),
            history: HistoryLog::new(),
            store,
            callback_sink: StubCallbackSink::new(),
            token_issuer: StubTokenIssuer::new(config.token),
        }
    }

    pub fn executor_name() -> ExecutorName {
        ExecutorName::new(MOCK_MODULE_PATH, MOCK_ALIAS)
    }

    pub fn base(&self) -> &BaseExecutor {
        &self.base
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn outcomes(&self) -> &OutcomeRegistry {
        &self.outcomes
    }

    pub fn callback_sink(&self) -> &StubCallbackSink {
        &self.callback_sink
    }

    pub fn token_issuer(&self) -> &StubTokenIssuer {
        &self.token_issuer
    }

    pub fn do_update(&self) -> bool {
        self.do_update
    }

    pub fn set_do_update(&mut self, do_update: bool) {
        self.do_update = do_update;
    }

    /// Make the un-fanned-out item fail when it is admitted.
    pub fn mock_task_fail(
        &mut self,
        owner_id: &str,
        item_id: &str,
        run_id: &str,
        attempt: u32,
    ) -> Result<()> {
        let key = WorkKey::new(owner_id, item_id, run_id, attempt, UNMAPPED_FAN_OUT);
        self.outcomes.set_override(key, State::Failed)
    }

    /// Force the outcome of `key`.
    pub fn mock_task_outcome(&mut self, key: WorkKey, state: State) -> Result<()> {
        self.outcomes.set_override(key, state)
    }

    /// Force an outcome from untyped key parts.
    pub fn mock_task_outcome_raw(
        &mut self,
        owner_id: &str,
        item_id: &str,
        run_id: &serde_json::Value,
        attempt: u32,
        fan_out: i32,
        state: State,
    ) -> Result<()> {
        self.outcomes
            .set_override_raw(owner_id, item_id, run_id, attempt, fan_out, state)
    }

    /// Occupy a slot with a pending workload, as a launching executor would.
    pub fn start_running(&mut self, key: &WorkKey) -> Result<()> {
        self.base.start_running(key)
    }

    /// Apply a state change and keep it in the ledger.
    pub fn change_state(
        &mut self,
        key: &WorkKey,
        state: State,
        info: Option<String>,
        remove_running: bool,
    ) {
        self.base
            .change_state(key, state, info.clone(), remove_running);
        self.ledger.record(key.clone(), state, info);
    }

    /// Report `key` as succeeded.
    pub fn success(&mut self, key: &WorkKey, info: Option<String>) {
        self.change_state(key, State::Success, info, true);
    }

    /// Report `key` as failed.
    pub fn fail(&mut self, key: &WorkKey, info: Option<String>) {
        self.change_state(key, State::Failed, info, true);
    }

    /// Token for a workload's key.
    pub fn issue_token(&mut self, key: &WorkKey) -> SecretString {
        self.token_issuer.generate(&key.to_string())
    }

    fn run_cycle(&mut self, span: &Span) -> Result<usize> {
        let history = &mut self.history;
        let base = &self.base;
        let outcomes = &self.outcomes;

        let applied = with_scoped_session(self.store.as_ref(), |session| {
            history.record(base.pending().values().cloned().collect());

            let open_slots = base.open_slots();
            metrics::open_slots().record(open_slots as u64, &[]);
            let admitted = select_batch(base.pending(), open_slots);

            let mut applied = Vec::with_capacity(admitted.len());
            for key in admitted {
                let state = outcomes.resolve(&key);
                let mut record = session.get_for_update(&key)?;
                session.set_state(&mut record, state)?;
                debug!(session_id = %session.id(), key = %key, %state, "outcome applied");
                applied.push((key, state));
            }
            Ok(applied)
        })?;

        let admitted = applied.len();
        for (key, state) in applied {
            self.base.take_pending(&key);
            record_state_transition(span, &key, State::Queued, state);
            metrics::workloads_admitted().add(1, &[KeyValue::new("state", state.to_string())]);
            self.change_state(&key, state, None, false);
        }
        Ok(admitted)
    }
}

impl Executor for MockExecutor {
    fn name(&self) -> &ExecutorName {
        &self.name
    }

    fn queue_workload(&mut self, workload: Workload) -> Result<()> {
        self.base.queue_workload(workload)?;
        metrics::workloads_queued().add(1, &[KeyValue::new("executor", MOCK_ALIAS)]);
        Ok(())
    }

    fn process_workloads(&mut self, workloads: Vec<Workload>) -> Result<()> {
        debug!(count = workloads.len(), "workloads left for heartbeat admission");
        Ok(())
    }

    fn heartbeat(&mut self) -> Result<()> {
        if !self.do_update {
            metrics::heartbeats().add(1, &[KeyValue::new("result", "skipped")]);
            return Ok(());
        }

        let span = start_heartbeat_span(
            &self.name.alias,
            self.base.open_slots(),
            self.base.queued_count(),
        );
        let _enter = span.enter();

        match self.run_cycle(&span) {
            Ok(admitted) => {
                span.record("executor.admitted", admitted as u64);
                debug!(
                    admitted,
                    queued = self.base.queued_count(),
                    "heartbeat completed"
                );
                metrics::heartbeats().add(1, &[KeyValue::new("result", "ok")]);
                Ok(())
            }
            Err(e) => {
                metrics::heartbeats().add(1, &[KeyValue::new("result", "error")]);
                Err(e)
            }
        }
    }

    fn terminate(&mut self) {
        debug!("terminate requested; mock executor cancels nothing");
    }

    fn end(&mut self) -> Result<()> {
        self.sync()
    }

    fn sync(&mut self) -> Result<()> {
        self.store.sync()
    }

    fn queued_count(&self) -> usize {
        self.base.queued_count()
    }

    fn running_count(&self) -> usize {
        self.base.running_count()
    }

    fn get_event_buffer(&mut self, owner_ids: Option<&[&str]>) -> EventBuffer {
        self.base.get_event_buffer(owner_ids)
    }

    fn send_callback(&mut self, request: CallbackRequest) -> Result<()> {
        self.callback_sink.send(request)
    }
}
