//! Tests for the in-memory task store and scoped sessions.

use mockexec::error::Error;
use mockexec::model::{State, WorkKey, Workload};
use mockexec::store::memory::InMemoryStore;
use mockexec::store::{RecordId, Session, TaskStore, with_scoped_session};

fn seeded(keys: &[&WorkKey]) -> InMemoryStore {
    let store = InMemoryStore::new();
    for key in keys {
        store.seed(&Workload::new((*key).clone())).unwrap();
    }
    store
}

#[test]
fn committed_session_is_visible() {
    let key = WorkKey::unmapped("etl", "extract", "run_1");
    let store = seeded(&[&key]);

    with_scoped_session(&store, |session| {
        let mut record = session.get_for_update(&key)?;
        session.set_state(&mut record, State::Success)
    })
    .unwrap();

    assert_eq!(store.state_of(&key).unwrap(), Some(State::Success));
    assert_eq!(store.commit_count(), 1);
    assert_eq!(store.rollback_count(), 0);
}

#[test]
fn failing_session_is_rolled_back() {
    let key = WorkKey::unmapped("etl", "extract", "run_1");
    let missing = WorkKey::unmapped("etl", "load", "run_1");
    let store = seeded(&[&key]);

    let err = with_scoped_session(&store, |session| {
        let mut record = session.get_for_update(&key)?;
        session.set_state(&mut record, State::Success)?;
        session.get_for_update(&missing)?;
        Ok(())
    })
    .unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(store.state_of(&key).unwrap(), Some(State::Queued));
    assert_eq!(store.rollback_count(), 1);
    assert_eq!(store.commit_count(), 0);
}

#[test]
fn set_state_requires_update_lock() {
    let key = WorkKey::unmapped("etl", "extract", "run_1");
    let store = seeded(&[&key]);
    let mut record = store.get(&key).unwrap().expect("seeded");

    let err = with_scoped_session(&store, |session| {
        session.set_state(&mut record, State::Failed)
    })
    .unwrap_err();

    assert!(matches!(err, Error::NotLocked(_)));
}

#[test]
fn staged_writes_are_read_back_within_session() {
    let key = WorkKey::unmapped("etl", "extract", "run_1");
    let store = seeded(&[&key]);

    let seen = with_scoped_session(&store, |session| {
        let mut record = session.get_for_update(&key)?;
        session.set_state(&mut record, State::Failed)?;
        Ok(session.get_for_update(&key)?.state)
    })
    .unwrap();

    assert_eq!(seen, Some(State::Failed));
}

#[test]
fn attempts_share_one_record() {
    let first = WorkKey::new("etl", "extract", "run_1", 1, 0);
    let retry = WorkKey::new("etl", "extract", "run_1", 2, 0);

    assert_eq!(RecordId::from(&first), RecordId::from(&retry));
    let store = seeded(&[&first, &retry]);
    assert_eq!(store.record_count().unwrap(), 1);
}

#[test]
fn sync_is_counted() {
    let store = InMemoryStore::new();
    store.sync().unwrap();
    store.sync().unwrap();
    assert_eq!(store.sync_count(), 2);
}
