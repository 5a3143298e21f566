//! Work keys, workloads, states and transition records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Priority weight used when a workload carries none.
pub const DEFAULT_PRIORITY_WEIGHT: i32 = 1;

/// Fan-out index of an item that was not expanded into parallel copies.
pub const UNMAPPED_FAN_OUT: i32 = -1;

// ---------------------------------------------------------------------------
// Work Key
// ---------------------------------------------------------------------------

/// Composite identity of one task attempt.
///
/// Unique among everything concurrently pending or running in an executor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkKey {
    /// Owning workflow (e.g. a DAG id).
    pub owner_id: String,
    /// Item within the owner (e.g. a task id).
    pub item_id: String,
    /// Run identifier. Always a string.
    pub run_id: String,
    /// Attempt number, starting at 1.
    pub attempt: u32,
    /// Fan-out index, [`UNMAPPED_FAN_OUT`] when not fanned out.
    pub fan_out: i32,
}

impl WorkKey {
    pub fn new(
        owner_id: impl Into<String>,
        item_id: impl Into<String>,
        run_id: impl Into<String>,
        attempt: u32,
        fan_out: i32,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            item_id: item_id.into(),
            run_id: run_id.into(),
            attempt,
            fan_out,
        }
    }

    /// Key for the first attempt of an un-fanned-out item.
    pub fn unmapped(
        owner_id: impl Into<String>,
        item_id: impl Into<String>,
        run_id: impl Into<String>,
    ) -> Self {
        Self::new(owner_id, item_id, run_id, 1, UNMAPPED_FAN_OUT)
    }

    /// Build a key from loosely typed parts, rejecting a run id that is not a
    /// string.
    pub fn from_raw(
        owner_id: &str,
        item_id: &str,
        run_id: &serde_json::Value,
        attempt: u32,
        fan_out: i32,
    ) -> Result<Self> {
        let run_id = run_id.as_str().ok_or_else(|| {
            Error::InvalidKey(format!(
                "run id for {owner_id}.{item_id} must be a string, got {run_id}"
            ))
        })?;
        let key = Self::new(owner_id, item_id, run_id, attempt, fan_out);
        key.validate()?;
        Ok(key)
    }

    /// Check the key is usable as an outcome override target.
    pub fn validate(&self) -> Result<()> {
        if self.run_id.is_empty() {
            return Err(Error::InvalidKey(format!(
                "run id for {}.{} must not be empty",
                self.owner_id, self.item_id
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for WorkKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{}[{}]#{}",
            self.owner_id, self.item_id, self.run_id, self.attempt
        )?;
        if self.fan_out != UNMAPPED_FAN_OUT {
            write!(f, "/{}", self.fan_out)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Lifecycle state of a task attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    Scheduled,
    Queued,
    Running,
    Success,
    Failed,
    UpForRetry,
    Skipped,
    Removed,
}

impl State {
    fn as_str(self) -> &'static str {
        match self {
            State::Scheduled => "scheduled",
            State::Queued => "queued",
            State::Running => "running",
            State::Success => "success",
            State::Failed => "failed",
            State::UpForRetry => "up_for_retry",
            State::Skipped => "skipped",
            State::Removed => "removed",
        }
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for State {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "scheduled" => Ok(State::Scheduled),
            "queued" => Ok(State::Queued),
            "running" => Ok(State::Running),
            "success" => Ok(State::Success),
            "failed" => Ok(State::Failed),
            "up_for_retry" => Ok(State::UpForRetry),
            "skipped" => Ok(State::Skipped),
            "removed" => Ok(State::Removed),
            other => Err(Error::Other(format!("unknown state: {other}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Workload
// ---------------------------------------------------------------------------

/// A pending unit of work waiting for a slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workload {
    pub key: WorkKey,

    /// Higher is admitted first. `None` means [`DEFAULT_PRIORITY_WEIGHT`].
    pub priority_weight: Option<i32>,

    /// When the workload was submitted.
    pub queued_at: DateTime<Utc>,

    /// Arbitrary data for the executor. Never interpreted by the dispatcher.
    pub payload: serde_json::Value,
}

impl Workload {
    pub fn new(key: WorkKey) -> Self {
        Self {
            key,
            priority_weight: None,
            queued_at: Utc::now(),
            payload: serde_json::Value::Null,
        }
    }

    pub fn priority_weight(mut self, weight: i32) -> Self {
        self.priority_weight = Some(weight);
        self
    }

    pub fn queued_at(mut self, at: DateTime<Utc>) -> Self {
        self.queued_at = at;
        self
    }

    pub fn payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// Weight used for ordering.
    pub fn effective_priority(&self) -> i32 {
        self.priority_weight.unwrap_or(DEFAULT_PRIORITY_WEIGHT)
    }
}

// ---------------------------------------------------------------------------
// Transition
// ---------------------------------------------------------------------------

/// One applied state change, as kept by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub key: WorkKey,
    pub state: State,
    pub info: Option<String>,
}
