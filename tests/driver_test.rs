//! Tests for the tokio heartbeat driver.

use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use mockexec::driver::{DriverConfig, HeartbeatDriver, StopReason};
use mockexec::executor::{Executor, ExecutorConfig, MockExecutor};
use mockexec::model::{WorkKey, Workload};
use mockexec::store::memory::InMemoryStore;

fn executor_with(parallelism: usize, items: usize) -> (MockExecutor, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let mut executor = MockExecutor::new(
        ExecutorConfig {
            parallelism,
            ..ExecutorConfig::default()
        },
        store.clone(),
    );
    for i in 0..items {
        let w = Workload::new(WorkKey::unmapped("etl", format!("t{i}"), "run_1"))
            .queued_at(DateTime::from_timestamp(i as i64, 0).unwrap());
        store.seed(&w).unwrap();
        executor.queue_workload(w).unwrap();
    }
    (executor, store)
}

fn fast(max_cycles: Option<u64>, stop_when_idle: bool) -> DriverConfig {
    DriverConfig {
        interval: Duration::from_millis(1),
        max_cycles,
        stop_when_idle,
    }
}

#[tokio::test]
async fn driver_runs_until_idle_and_ends() {
    let (executor, store) = executor_with(2, 5);
    let mut driver = HeartbeatDriver::new(executor, fast(None, true));

    let summary = driver.run().await.unwrap();

    assert_eq!(summary.reason, StopReason::Idle);
    assert_eq!(summary.cycles, 3);
    assert_eq!(driver.executor().ledger().len(), 5);
    assert_eq!(store.sync_count(), 1);
}

#[tokio::test]
async fn driver_stops_after_max_cycles() {
    let (executor, _store) = executor_with(1, 5);
    let mut driver = HeartbeatDriver::new(executor, fast(Some(2), false));

    let summary = driver.run().await.unwrap();

    assert_eq!(summary.reason, StopReason::MaxCycles);
    assert_eq!(summary.cycles, 2);
    assert_eq!(driver.executor().queued_count(), 3);
}

#[tokio::test]
async fn driver_honours_shutdown_sent_before_run() {
    let (executor, store) = executor_with(1, 2);
    let mut driver = HeartbeatDriver::new(
        executor,
        DriverConfig {
            interval: Duration::from_secs(60),
            max_cycles: None,
            stop_when_idle: false,
        },
    );

    driver.shutdown_handle().notify_one();
    let summary = driver.run().await.unwrap();

    assert_eq!(summary.reason, StopReason::Shutdown);
    assert_eq!(summary.cycles, 0);
    assert!(driver.executor().ledger().is_empty());
    assert_eq!(store.sync_count(), 1);
}

#[tokio::test]
async fn driver_propagates_heartbeat_failure() {
    let (mut executor, store) = executor_with(2, 1);
    // No store record for this one.
    executor
        .queue_workload(
            Workload::new(WorkKey::unmapped("etl", "orphan", "run_1"))
                .queued_at(DateTime::from_timestamp(100, 0).unwrap()),
        )
        .unwrap();
    let mut driver = HeartbeatDriver::new(executor, fast(None, true));

    let result = driver.run().await;

    assert!(result.is_err());
    assert_eq!(store.sync_count(), 0);
    assert_eq!(driver.into_executor().queued_count(), 2);
}

#[tokio::test]
async fn driver_stops_when_no_slot_can_open() {
    let (executor, store) = executor_with(0, 1);
    let mut driver = HeartbeatDriver::new(executor, fast(None, true));

    let summary = driver.run().await.unwrap();

    assert_eq!(summary.reason, StopReason::Stalled);
    assert_eq!(summary.cycles, 1);
    assert_eq!(driver.executor().history().len(), 1);
    assert_eq!(driver.executor().queued_count(), 1);
    assert_eq!(store.sync_count(), 1);
}

#[tokio::test]
async fn driver_stops_when_updates_are_disabled() {
    let (mut executor, _store) = executor_with(4, 2);
    executor.set_do_update(false);
    let mut driver = HeartbeatDriver::new(executor, fast(None, true));

    let summary = driver.run().await.unwrap();

    assert_eq!(summary.reason, StopReason::Stalled);
    assert_eq!(summary.cycles, 1);
    assert!(driver.executor().history().is_empty());
    assert!(driver.executor().ledger().is_empty());
}
