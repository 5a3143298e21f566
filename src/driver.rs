//! Heartbeat driver: calls an executor's heartbeat on a fixed interval until
//! told to stop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::Result;
use crate::executor::Executor;

/// Configuration for the heartbeat driver.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Delay between heartbeats.
    pub interval: Duration,
    /// Stop after this many heartbeats.
    pub max_cycles: Option<u64>,
    /// Stop as soon as nothing is pending after a heartbeat, or when a
    /// heartbeat admits nothing while nothing is running.
    pub stop_when_idle: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_cycles: None,
            stop_when_idle: false,
        }
    }
}

/// Why the driver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Shutdown,
    MaxCycles,
    Idle,
    /// Work is pending but no heartbeat can admit it: no capacity, or
    /// updates are disabled.
    Stalled,
}

/// Outcome of a completed drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriveSummary {
    pub cycles: u64,
    pub reason: StopReason,
}

/// Drives an executor's heartbeat loop.
pub struct HeartbeatDriver<E: Executor> {
    executor: E,
    config: DriverConfig,
    shutdown: Arc<Notify>,
}

impl<E: Executor> HeartbeatDriver<E> {
    pub fn new(executor: E, config: DriverConfig) -> Self {
        Self {
            executor,
            config,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Handle that stops [`HeartbeatDriver::run`] when notified. A
    /// notification sent before `run` starts is kept.
    pub fn shutdown_handle(&self) -> Arc<Notify> {
        Arc::clone(&self.shutdown)
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn executor_mut(&mut self) -> &mut E {
        &mut self.executor
    }

    pub fn into_executor(self) -> E {
        self.executor
    }

    /// Run heartbeats until shutdown, `max_cycles`, idle or stalled. A failing
    /// heartbeat stops the loop and is returned without retry. `end` is
    /// called on every successful stop.
    pub async fn run(&mut self) -> Result<DriveSummary> {
        info!(executor = %self.executor.name(), "heartbeat driver started");
        let mut cycles = 0u64;

        let reason = loop {
            if self.config.max_cycles.is_some_and(|max| cycles >= max) {
                break StopReason::MaxCycles;
            }

            tokio::select! {
                _ = self.shutdown.notified() => {
                    break StopReason::Shutdown;
                }
                _ = tokio::time::sleep(self.config.interval) => {}
            }

            let queued_before = self.executor.queued_count();
            if let Err(e) = self.executor.heartbeat() {
                error!(cycle = cycles + 1, "heartbeat failed: {e}");
                return Err(e);
            }
            cycles += 1;

            if self.config.stop_when_idle {
                let queued = self.executor.queued_count();
                if queued == 0 {
                    break StopReason::Idle;
                }
                if queued >= queued_before && self.executor.running_count() == 0 {
                    warn!(cycle = cycles, queued, "heartbeat admitted nothing, stopping");
                    break StopReason::Stalled;
                }
            }
        };

        self.executor.end()?;
        info!(cycles, ?reason, "heartbeat driver stopped");
        Ok(DriveSummary { cycles, reason })
    }
}
