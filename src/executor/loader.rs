//! Resolve a configured executor name to an implementation.

use std::sync::Arc;

use super::{ExecutorConfig, ExecutorName, MockExecutor};
use crate::error::{Error, Result};
use crate::store::TaskStore;

/// Executor implementations selectable by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorKind {
    Mock,
}

impl ExecutorKind {
    pub const ALL: &'static [ExecutorKind] = &[ExecutorKind::Mock];

    pub fn name(self) -> ExecutorName {
        match self {
            ExecutorKind::Mock => MockExecutor::executor_name(),
        }
    }
}

/// Map a module path or alias to an executor kind. `None` is the default.
pub fn resolve(name: Option<&str>) -> Result<ExecutorKind> {
    let Some(name) = name else {
        return Ok(ExecutorKind::Mock);
    };
    ExecutorKind::ALL
        .iter()
        .copied()
        .find(|kind| kind.name().matches(name))
        .ok_or_else(|| Error::UnknownExecutor(name.to_string()))
}

/// Build the mock executor if `name` resolves to it.
pub fn load_mock(
    name: Option<&str>,
    config: ExecutorConfig,
    store: Arc<dyn TaskStore>,
) -> Result<MockExecutor> {
    match resolve(name)? {
        ExecutorKind::Mock => Ok(MockExecutor::new(config, store)),
    }
}
