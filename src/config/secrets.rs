//! Secret handling utilities.
//!
//! Re-exports the secrecy types used for workload tokens.

pub use secrecy::{ExposeSecret, SecretString};
