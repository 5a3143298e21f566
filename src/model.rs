//! Core data model.
//!
//! A work item is one schedulable task attempt. It has a composite identity
//! ([`WorkKey`]), an optional priority weight, a submission timestamp, and an
//! opaque payload. The executor moves it from pending to a terminal [`State`].

pub mod work;

pub use work::{DEFAULT_PRIORITY_WEIGHT, State, Transition, UNMAPPED_FAN_OUT, WorkKey, Workload};
