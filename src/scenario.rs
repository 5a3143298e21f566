//! Scenario files: a TOML description of workloads, outcome overrides and
//! executor settings for a simulation run.
//!
//! ```toml
//! parallelism = 2
//! heartbeats = 3
//!
//! [[workload]]
//! owner_id = "etl"
//! item_id = "extract"
//! run_id = "manual__2026-01-01"
//! priority_weight = 5
//! queued_at = "2026-01-01T00:00:00Z"
//!
//! [[outcome]]
//! owner_id = "etl"
//! item_id = "extract"
//! run_id = "manual__2026-01-01"
//! state = "failed"
//! ```

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::executor::{Executor, MockExecutor};
use crate::model::{State, UNMAPPED_FAN_OUT, WorkKey, Workload};
use crate::store::memory::InMemoryStore;

fn first_attempt() -> u32 {
    1
}

fn unmapped() -> i32 {
    UNMAPPED_FAN_OUT
}

/// A whole simulation.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Executor name; falls back to configuration.
    pub executor: Option<String>,
    /// Capacity override.
    pub parallelism: Option<usize>,
    /// Number of heartbeats to run. `None` runs until the queue drains.
    pub heartbeats: Option<u64>,
    #[serde(default, rename = "workload")]
    pub workloads: Vec<WorkloadSpec>,
    #[serde(default, rename = "outcome")]
    pub outcomes: Vec<OutcomeSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkloadSpec {
    pub owner_id: String,
    pub item_id: String,
    pub run_id: String,
    #[serde(default = "first_attempt")]
    pub attempt: u32,
    #[serde(default = "unmapped")]
    pub fan_out: i32,
    pub priority_weight: Option<i32>,
    pub queued_at: DateTime<Utc>,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl WorkloadSpec {
    pub fn to_workload(&self) -> Workload {
        let key = WorkKey::new(
            self.owner_id.clone(),
            self.item_id.clone(),
            self.run_id.clone(),
            self.attempt,
            self.fan_out,
        );
        Workload {
            key,
            priority_weight: self.priority_weight,
            queued_at: self.queued_at,
            payload: self.payload.clone(),
        }
    }
}

/// An outcome override. `run_id` is kept untyped so a non-string value is
/// reported as an invalid key rather than a parse error.
#[derive(Debug, Clone, Deserialize)]
pub struct OutcomeSpec {
    pub owner_id: String,
    pub item_id: String,
    pub run_id: serde_json::Value,
    #[serde(default = "first_attempt")]
    pub attempt: u32,
    #[serde(default = "unmapped")]
    pub fan_out: i32,
    pub state: State,
}

impl Scenario {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("bad scenario: {e}")))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("bad scenario {}: {e}", path.display())))
    }

    /// Seed `store` with a queued record per workload.
    pub fn seed_store(&self, store: &InMemoryStore) -> Result<()> {
        for spec in &self.workloads {
            store.seed(&spec.to_workload())?;
        }
        Ok(())
    }

    /// Register overrides, then queue every workload.
    pub fn apply(&self, executor: &mut MockExecutor) -> Result<()> {
        for o in &self.outcomes {
            executor.mock_task_outcome_raw(
                &o.owner_id,
                &o.item_id,
                &o.run_id,
                o.attempt,
                o.fan_out,
                o.state,
            )?;
        }
        for spec in &self.workloads {
            executor.queue_workload(spec.to_workload())?;
        }
        Ok(())
    }
}
