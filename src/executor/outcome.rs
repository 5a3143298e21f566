//! Predetermined terminal outcomes per work key.

use std::collections::HashMap;

use tracing::debug;

use crate::error::Result;
use crate::model::{State, WorkKey};

/// Producer of the outcome for keys without an override.
pub type DefaultOutcome = fn() -> State;

/// Default outcome: every admitted item succeeds.
pub fn success() -> State {
    State::Success
}

/// Two-tier lookup: explicit overrides first, then a named default producer.
#[derive(Debug, Clone)]
pub struct OutcomeRegistry {
    overrides: HashMap<WorkKey, State>,
    default: DefaultOutcome,
}

impl Default for OutcomeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl OutcomeRegistry {
    pub fn new() -> Self {
        Self::with_default(success)
    }

    pub fn with_default(default: DefaultOutcome) -> Self {
        Self {
            overrides: HashMap::new(),
            default,
        }
    }

    /// Force the outcome of `key`. The key is validated before anything is
    /// stored.
    pub fn set_override(&mut self, key: WorkKey, state: State) -> Result<()> {
        key.validate()?;
        debug!(key = %key, %state, "outcome override registered");
        self.overrides.insert(key, state);
        Ok(())
    }

    /// Like [`OutcomeRegistry::set_override`], for keys whose run id comes
    /// from untyped input.
    pub fn set_override_raw(
        &mut self,
        owner_id: &str,
        item_id: &str,
        run_id: &serde_json::Value,
        attempt: u32,
        fan_out: i32,
        state: State,
    ) -> Result<()> {
        let key = WorkKey::from_raw(owner_id, item_id, run_id, attempt, fan_out)?;
        self.set_override(key, state)
    }

    /// Outcome for `key`. Never fails.
    pub fn resolve(&self, key: &WorkKey) -> State {
        self.overrides
            .get(key)
            .copied()
            .unwrap_or_else(|| (self.default)())
    }

    pub fn is_overridden(&self, key: &WorkKey) -> bool {
        self.overrides.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}
