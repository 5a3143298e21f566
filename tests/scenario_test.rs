//! Tests for scenario loading and application.

use std::sync::Arc;

use mockexec::error::Error;
use mockexec::executor::{Executor, ExecutorConfig, MockExecutor};
use mockexec::model::State;
use mockexec::scenario::Scenario;
use mockexec::store::memory::InMemoryStore;

const SCENARIO: &str = r#"
parallelism = 1
heartbeats = 2

[[workload]]
owner_id = "etl"
item_id = "extract"
run_id = "manual__1"
queued_at = "2026-01-01T00:00:00Z"

[[workload]]
owner_id = "etl"
item_id = "load"
run_id = "manual__1"
priority_weight = 9
queued_at = "2026-01-01T00:05:00Z"
payload = { table = "events" }

[[outcome]]
owner_id = "etl"
item_id = "load"
run_id = "manual__1"
state = "failed"
"#;

fn build(scenario: &Scenario) -> (MockExecutor, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    scenario.seed_store(&store).unwrap();
    let config = ExecutorConfig {
        parallelism: scenario.parallelism.unwrap_or(4),
        ..ExecutorConfig::default()
    };
    (MockExecutor::new(config, store.clone()), store)
}

#[test]
fn scenario_parses_defaults() {
    let scenario = Scenario::from_toml_str(SCENARIO).unwrap();

    assert_eq!(scenario.parallelism, Some(1));
    assert_eq!(scenario.heartbeats, Some(2));
    assert_eq!(scenario.workloads.len(), 2);
    assert_eq!(scenario.workloads[0].attempt, 1);
    assert_eq!(scenario.workloads[0].fan_out, -1);
    assert_eq!(scenario.workloads[1].payload["table"], "events");
    assert_eq!(scenario.outcomes[0].state, State::Failed);
}

#[test]
fn scenario_runs_in_priority_order_with_overrides() {
    let scenario = Scenario::from_toml_str(SCENARIO).unwrap();
    let (mut executor, store) = build(&scenario);
    scenario.apply(&mut executor).unwrap();

    executor.heartbeat().unwrap();
    executor.heartbeat().unwrap();

    let entries = executor.ledger().entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].key.item_id, "load");
    assert_eq!(entries[0].state, State::Failed);
    assert_eq!(entries[1].key.item_id, "extract");
    assert_eq!(entries[1].state, State::Success);
    assert_eq!(store.record_count().unwrap(), 2);
}

#[test]
fn non_string_run_id_in_outcome_is_invalid_key() {
    let scenario = Scenario::from_toml_str(
        r#"
[[outcome]]
owner_id = "etl"
item_id = "extract"
run_id = 20260101
state = "failed"
"#,
    )
    .unwrap();
    let (mut executor, _store) = build(&scenario);

    let err = scenario.apply(&mut executor).unwrap_err();
    assert!(matches!(err, Error::InvalidKey(_)));
}

#[test]
fn malformed_scenario_is_config_error() {
    let err = Scenario::from_toml_str("[[workload]]\nowner_id = 3").unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn load_reads_scenario_file() {
    let path = std::env::temp_dir().join(format!("mockexec-scenario-{}.toml", std::process::id()));
    std::fs::write(&path, SCENARIO).unwrap();

    let scenario = Scenario::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(scenario.workloads.len(), 2);
    assert_eq!(scenario.outcomes.len(), 1);
}

#[test]
fn missing_scenario_file_is_io_error() {
    let path = std::env::temp_dir().join("mockexec-no-such-scenario.toml");

    let err = Scenario::load(&path).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}
