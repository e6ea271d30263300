use super::common::*;
use crate::workflows::checklist::ItemStatus;
use crate::workflows::session::{Session, SessionError, SessionId, SessionRepository};

#[test]
fn generated_ids_are_unique_and_zero_padded() {
    let first = SessionId::generate();
    let second = SessionId::generate();
    assert_ne!(first, second);
    assert!(first.0.starts_with("session-"));
    assert_eq!(first.0.len(), "session-000000".len());
}

#[test]
fn new_sessions_start_from_the_builtin_catalog() {
    let session = Session::new(fields());
    assert_eq!(session.checklist.len(), 15);
    assert!(session.incidences.is_empty());
    assert_eq!(session.fields.community_name, "Torre Norte");
}

#[test]
fn sessions_are_isolated_from_each_other() {
    let repository = MemorySessions::default();
    let first = seeded(&repository);
    let second = seeded(&repository);

    repository
        .update(&first, |session| {
            session.checklist.set_all_status(ItemStatus::Ok);
            session.incidences.add("Ana", "Atraso").map(|_| ())
        })
        .expect("session exists")
        .expect("valid incidence");

    let untouched = repository
        .read(&second, |session| (session.checklist.stats(), session.incidences.len()))
        .expect("session exists");
    assert_eq!(untouched.0.ok, 0);
    assert_eq!(untouched.0.pending, 15);
    assert_eq!(untouched.1, 0);
}

#[test]
fn snapshot_reflects_one_consistent_read() {
    let repository = MemorySessions::default();
    let id = seeded(&repository);
    repository
        .update(&id, |session| session.checklist.set_status(2, ItemStatus::Fail))
        .expect("session exists")
        .expect("item exists");

    let snapshot = repository
        .read(&id, Session::snapshot)
        .expect("session exists");
    assert_eq!(snapshot.stats().fail, 1);
    assert_eq!(snapshot.report_date, report_date());
}

#[test]
fn removed_sessions_are_not_found() {
    let repository = MemorySessions::default();
    let id = seeded(&repository);
    repository.remove(&id).expect("session exists");

    assert_eq!(
        repository.read(&id, |_| ()),
        Err(SessionError::NotFound(id.clone()))
    );
    assert_eq!(repository.remove(&id), Err(SessionError::NotFound(id)));
}
