//! # mockexec
//!
//! Deterministic task-dispatch simulator.
//!
//! A bounded-concurrency heartbeat loop admits a priority-ordered prefix of
//! pending work each cycle, resolves predetermined outcomes, writes terminal
//! states to a transactional store, and keeps an exact ledger and pending-queue
//! history for replay assertions. Also carries the doc-build argument
//! serializer, a tokio heartbeat driver, and OpenTelemetry observability.

pub mod config;
pub mod doc_build;
pub mod driver;
pub mod error;
pub mod executor;
pub mod model;
pub mod scenario;
pub mod store;
pub mod telemetry;
