use building_ops::workflows::checklist::{Category, ChecklistStore, ItemStatus};
use building_ops::workflows::incidences::{IncidenceError, IncidenceLog};
use chrono::NaiveDate;
use std::collections::HashSet;

#[test]
fn add_grows_by_one_with_next_id() {
    let mut store = ChecklistStore::default();
    for expected in 1..=4u32 {
        let before = store.len();
        let item = store
            .add(Category::Access, &format!("Portón {expected}"), None)
            .expect("name present");
        assert_eq!(item.id, expected);
        assert_eq!(store.len(), before + 1);
    }

    let mut ids = HashSet::new();
    ids.insert(2);
    store.remove(&ids);
    let item = store
        .add(Category::Infrastructure, "Techumbre", Some("Canaletas"))
        .expect("name present");
    assert_eq!(item.id, 4);
}

#[test]
fn remove_leaves_dense_ids_in_relative_order() {
    for removed in [vec![], vec![1], vec![3, 7, 15], (1..=15).collect::<Vec<u32>>()] {
        let mut store = ChecklistStore::standard();
        let names_before: Vec<String> = store
            .items()
            .iter()
            .filter(|item| !removed.contains(&item.id))
            .map(|item| item.name.clone())
            .collect();

        let ids: HashSet<u32> = removed.iter().copied().collect();
        assert_eq!(store.remove(&ids), removed.len());

        let ids_after: Vec<u32> = store.items().iter().map(|item| item.id).collect();
        let expected: Vec<u32> = (1..=names_before.len() as u32).collect();
        assert_eq!(ids_after, expected);
        let names_after: Vec<String> =
            store.items().iter().map(|item| item.name.clone()).collect();
        assert_eq!(names_after, names_before);
    }
}

#[test]
fn bulk_status_moves_every_item() {
    for status in [ItemStatus::Ok, ItemStatus::Pending, ItemStatus::Fail] {
        let mut store = ChecklistStore::standard();
        store.set_status(4, ItemStatus::Fail).expect("item exists");
        store.set_all_status(status);

        let stats = store.stats();
        assert_eq!(stats.count(status), stats.total);
        for other in [ItemStatus::Ok, ItemStatus::Pending, ItemStatus::Fail] {
            if other != status {
                assert_eq!(stats.count(other), 0);
            }
        }
    }
}

#[test]
fn category_filter_keeps_insertion_order() {
    let mut store = ChecklistStore::standard();
    store
        .add(Category::Access, "Citófono", None)
        .expect("name present");
    let names: Vec<&str> = store
        .filter_by_category(Category::Access)
        .into_iter()
        .map(|item| item.name.as_str())
        .collect();
    assert_eq!(names, vec!["Portones (2)", "Control Biométrico", "Citófono"]);
}

#[test]
fn incidence_log_validates_and_lists_newest_first() {
    let mut log = IncidenceLog::default();
    assert_eq!(log.add("", "detail").err(), Some(IncidenceError::EmptyEmployee));
    assert_eq!(log.add("name", "  ").err(), Some(IncidenceError::EmptyDetail));
    assert!(log.is_empty());

    log.add("Ana", "Late").expect("valid");
    log.add("Ana", "Late again").expect("valid");
    let details: Vec<&str> = log
        .list_sorted()
        .into_iter()
        .map(|record| record.detail.as_str())
        .collect();
    assert_eq!(details, vec!["Late again", "Late"]);
}

#[test]
fn incidence_ids_are_never_reused_below_the_maximum() {
    let day = NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date");
    let mut log = IncidenceLog::default();
    for hour in 8..11 {
        let at = day.and_hms_opt(hour, 0, 0).expect("valid time");
        log.add_at("Luis", "Ronda", at).expect("valid");
    }
    assert!(log.remove(2));
    assert!(!log.remove(2));

    let at = day.and_hms_opt(7, 30, 0).expect("valid time");
    let id = log.add_at("Luis", "Ingreso", at).expect("valid").id;
    assert_eq!(id, 4);

    let ids: Vec<u32> = log.list_sorted().into_iter().map(|record| record.id).collect();
    assert_eq!(ids, vec![3, 1, 4]);
}
