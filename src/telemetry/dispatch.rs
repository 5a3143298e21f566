//! Heartbeat span helpers.

use tracing::Span;

use crate::model::{State, WorkKey};

/// Start a span covering one heartbeat cycle.
///
/// `executor.admitted` is declared empty and filled in once the cycle's
/// batch has been committed.
pub fn start_heartbeat_span(executor: &str, open_slots: usize, queued: usize) -> Span {
    tracing::info_span!(
        "executor.heartbeat",
        "executor.name" = executor,
        "executor.open_slots" = open_slots as u64,
        "executor.queued" = queued as u64,
        "executor.admitted" = tracing::field::Empty,
    )
}

/// Emit a state transition event for `key` inside `span`.
pub fn record_state_transition(span: &Span, key: &WorkKey, from: State, to: State) {
    span.in_scope(|| {
        tracing::info!(
            key = %key,
            from = %from,
            to = %to,
            "state_transition"
        );
    });
}
