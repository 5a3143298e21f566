//! Metric instrument factories for mockexec.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! Without a provider every instrument is a no-op.

use opentelemetry::metrics::{Counter, Histogram, Meter};

fn meter() -> Meter {
    opentelemetry::global::meter("mockexec")
}

/// Counter: heartbeat cycles.
/// Labels: `result` ("ok" | "skipped" | "error").
pub fn heartbeats() -> Counter<u64> {
    meter()
        .u64_counter("mockexec.executor.heartbeats")
        .with_description("Number of heartbeat cycles")
        .build()
}

/// Counter: workloads admitted out of the pending set.
/// Labels: `state` (terminal state written).
pub fn workloads_admitted() -> Counter<u64> {
    meter()
        .u64_counter("mockexec.executor.admitted")
        .with_description("Number of workloads admitted by heartbeats")
        .build()
}

/// Counter: workloads added to the pending set.
/// Labels: `executor`.
pub fn workloads_queued() -> Counter<u64> {
    meter()
        .u64_counter("mockexec.executor.queued")
        .with_description("Number of workloads queued")
        .build()
}

/// Histogram: free slots seen at the start of each cycle.
pub fn open_slots() -> Histogram<u64> {
    meter()
        .u64_histogram("mockexec.executor.open_slots")
        .with_description("Open slots per heartbeat")
        .build()
}
