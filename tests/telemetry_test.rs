//! Integration tests for telemetry initialization and span helpers.

use mockexec::model::{State, WorkKey};

#[test]
fn telemetry_initializes_without_endpoint() {
    // A global subscriber can only be set once per process, so a second
    // initialization in the same test binary may return Err.
    let config = mockexec::telemetry::TelemetryConfig {
        endpoint: None,
        service_name: "mockexec-test".to_string(),
        log_level: "debug".to_string(),
    };
    let _guard = mockexec::telemetry::init_telemetry(config);
}

#[test]
fn heartbeat_span_creates_and_records_transition() {
    let span = mockexec::telemetry::dispatch::start_heartbeat_span("mock_executor", 4, 2);
    let key = WorkKey::unmapped("etl", "extract", "run_1");
    mockexec::telemetry::dispatch::record_state_transition(&span, &key, State::Queued, State::Success);
    span.record("executor.admitted", 1u64);
}

#[test]
fn metric_instruments_build_without_provider() {
    mockexec::telemetry::metrics::heartbeats().add(1, &[]);
    mockexec::telemetry::metrics::workloads_admitted().add(1, &[]);
    mockexec::telemetry::metrics::workloads_queued().add(1, &[]);
    mockexec::telemetry::metrics::open_slots().record(3, &[]);
}
