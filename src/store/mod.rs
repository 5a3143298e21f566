//! External task-state store.
//!
//! The executor never owns task state. It reads records under an update lock
//! and writes terminal states through a [`Session`], which is committed as a
//! whole or discarded as a whole. [`with_scoped_session`] is the only way the
//! executor opens one, so release happens on every exit path.

pub mod memory;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::model::{State, WorkKey, Workload};

/// Identity of a stored task record. Every attempt of the same item in the
/// same run and fan-out slot writes to one record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId {
    pub owner_id: String,
    pub item_id: String,
    pub run_id: String,
    pub fan_out: i32,
}

impl From<&WorkKey> for RecordId {
    fn from(key: &WorkKey) -> Self {
        Self {
            owner_id: key.owner_id.clone(),
            item_id: key.item_id.clone(),
            run_id: key.run_id.clone(),
            fan_out: key.fan_out,
        }
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{}[{}]/{}",
            self.owner_id, self.item_id, self.run_id, self.fan_out
        )
    }
}

/// A task record as held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: RecordId,
    /// Attempt the record currently belongs to.
    pub attempt: u32,
    /// `None` until the scheduler assigns a state.
    pub state: Option<State>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TaskRecord {
    /// A queued record for the given workload.
    pub fn for_workload(workload: &Workload) -> Self {
        Self {
            id: RecordId::from(&workload.key),
            attempt: workload.key.attempt,
            state: Some(State::Queued),
            updated_at: None,
        }
    }
}

/// One open transaction against the store.
///
/// Dropping a session without calling [`Session::commit`] discards every
/// staged write.
pub trait Session {
    /// Identifier used in logs.
    fn id(&self) -> Uuid;

    /// Fetch the record for `key`, taking its update lock for the rest of the
    /// session.
    fn get_for_update(&mut self, key: &WorkKey) -> Result<TaskRecord>;

    /// Stage a new state for a record previously fetched with
    /// [`Session::get_for_update`].
    fn set_state(&mut self, record: &mut TaskRecord, state: State) -> Result<()>;

    /// Make every staged write visible.
    fn commit(self: Box<Self>) -> Result<()>;
}

/// Session provider plus durability hook.
pub trait TaskStore: Send + Sync {
    /// Open a session. Sessions are exclusive: only one may be open at a time.
    fn begin(&self) -> Result<Box<dyn Session + '_>>;

    /// Make committed state durable.
    fn sync(&self) -> Result<()>;
}

/// Run `f` inside a session that is committed if `f` succeeds and rolled back
/// otherwise.
pub fn with_scoped_session<'s, T, F>(store: &'s dyn TaskStore, f: F) -> Result<T>
where
    F: FnOnce(&mut (dyn Session + 's)) -> Result<T>,
{
    let mut session = store.begin()?;
    let result = f(session.as_mut())?;
    session.commit()?;
    Ok(result)
}
