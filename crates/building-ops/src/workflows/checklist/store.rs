use super::catalog::{standard_catalog, MasterDataRow};
use super::domain::{Category, ChecklistError, ChecklistItem, ItemStatus, Stats};
use std::collections::HashSet;

/// Where a store takes its items from when (re)initialized.
#[derive(Debug, Clone)]
pub enum ChecklistSource {
    Standard,
    MasterData(Vec<MasterDataRow>),
}

/// Ordered, in-memory collection of inspection items.
///
/// Ids are dense: after any removal the remaining items are renumbered
/// `1..=N` in their current order, so an id held across a removal must be
/// resolved again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecklistStore {
    items: Vec<ChecklistItem>,
}

impl ChecklistStore {
    pub fn standard() -> Self {
        let mut store = Self::default();
        store.initialize(ChecklistSource::Standard);
        store
    }

    /// Replaces every item with the given source, assigning ids in row order.
    pub fn initialize(&mut self, source: ChecklistSource) {
        let rows = match source {
            ChecklistSource::Standard => standard_catalog(),
            ChecklistSource::MasterData(rows) => rows,
        };

        self.items = rows
            .into_iter()
            .zip(1u32..)
            .map(|(row, id)| {
                ChecklistItem::new(id, row.category, &row.name, Some(row.task.as_str()))
            })
            .collect();
    }

    pub fn add(
        &mut self,
        category: Category,
        name: &str,
        task: Option<&str>,
    ) -> Result<&ChecklistItem, ChecklistError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ChecklistError::EmptyName);
        }

        let id = self.next_id();
        self.items.push(ChecklistItem::new(id, category, name, task));
        Ok(&self.items[self.items.len() - 1])
    }

    /// Removes every item whose id is in `ids` and renumbers the rest.
    /// Returns how many items were removed.
    pub fn remove(&mut self, ids: &HashSet<u32>) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !ids.contains(&item.id));
        for (item, id) in self.items.iter_mut().zip(1u32..) {
            item.id = id;
        }
        before - self.items.len()
    }

    pub fn set_all_status(&mut self, status: ItemStatus) {
        for item in &mut self.items {
            item.status = status;
        }
    }

    pub fn set_status(&mut self, id: u32, status: ItemStatus) -> Result<(), ChecklistError> {
        self.item_mut(id)?.status = status;
        Ok(())
    }

    pub fn set_note(&mut self, id: u32, note: &str) -> Result<(), ChecklistError> {
        self.item_mut(id)?.note = note.to_string();
        Ok(())
    }

    /// Attaches a photo, replacing any previous one.
    pub fn set_photo(&mut self, id: u32, photo: Vec<u8>) -> Result<(), ChecklistError> {
        self.item_mut(id)?.photo = Some(photo);
        Ok(())
    }

    pub fn clear_photo(&mut self, id: u32) -> Result<(), ChecklistError> {
        self.item_mut(id)?.photo = None;
        Ok(())
    }

    pub fn filter_by_category(&self, category: Category) -> Vec<&ChecklistItem> {
        self.items
            .iter()
            .filter(|item| item.category == category)
            .collect()
    }

    pub fn get(&self, id: u32) -> Option<&ChecklistItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn items(&self) -> &[ChecklistItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn stats(&self) -> Stats {
        Stats::from_items(&self.items)
    }

    /// Current items projected back into master-data rows.
    pub fn to_rows(&self) -> Vec<MasterDataRow> {
        self.items
            .iter()
            .map(|item| MasterDataRow::new(item.category, item.name.clone(), item.task.clone()))
            .collect()
    }

    fn next_id(&self) -> u32 {
        self.items.iter().map(|item| item.id).max().unwrap_or(0) + 1
    }

    fn item_mut(&mut self, id: u32) -> Result<&mut ChecklistItem, ChecklistError> {
        self.items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(ChecklistError::ItemNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::checklist::domain::TASK_PLACEHOLDER;

    fn ids(store: &ChecklistStore) -> Vec<u32> {
        store.items().iter().map(|item| item.id).collect()
    }

    #[test]
    fn standard_store_seeds_fifteen_pending_items() {
        let store = ChecklistStore::standard();
        assert_eq!(store.len(), 15);
        assert_eq!(ids(&store), (1..=15).collect::<Vec<_>>());
        assert!(store
            .items()
            .iter()
            .all(|item| item.status == ItemStatus::Pending && item.note.is_empty()));
        assert_eq!(store.filter_by_category(Category::Critical).len(), 5);
        assert_eq!(store.filter_by_category(Category::Access).len(), 2);
    }

    #[test]
    fn add_assigns_next_id_and_defaults() {
        let mut store = ChecklistStore::standard();
        let item = store
            .add(Category::Access, "  Citófono ", None)
            .expect("name present");
        assert_eq!(item.id, 16);
        assert_eq!(item.name, "Citófono");
        assert_eq!(item.task, TASK_PLACEHOLDER);
        assert_eq!(item.status, ItemStatus::Pending);
        assert!(item.photo.is_none());
        assert_eq!(store.len(), 16);
    }

    #[test]
    fn add_to_empty_store_starts_at_one() {
        let mut store = ChecklistStore::default();
        let item = store
            .add(Category::Common, "Terraza", Some("Barandas"))
            .expect("name present");
        assert_eq!(item.id, 1);
    }

    #[test]
    fn add_rejects_blank_name() {
        let mut store = ChecklistStore::standard();
        assert_eq!(
            store.add(Category::Common, "   ", Some("x")).unwrap_err(),
            ChecklistError::EmptyName
        );
        assert_eq!(store.len(), 15);
    }

    #[test]
    fn remove_renumbers_remaining_items_in_order() {
        let mut store = ChecklistStore::standard();
        let third_name = store.get(3).expect("item 3").name.clone();
        let removed = store.remove(&HashSet::from([1, 2, 99]));
        assert_eq!(removed, 2);
        assert_eq!(ids(&store), (1..=13).collect::<Vec<_>>());
        assert_eq!(store.get(1).expect("renumbered").name, third_name);
    }

    #[test]
    fn remove_everything_leaves_empty_store() {
        let mut store = ChecklistStore::standard();
        let all: HashSet<u32> = (1..=15).collect();
        assert_eq!(store.remove(&all), 15);
        assert!(store.is_empty());
        assert_eq!(store.add(Category::Hygiene, "Baños", None).expect("add").id, 1);
    }

    #[test]
    fn set_all_status_moves_every_count() {
        let mut store = ChecklistStore::standard();
        store.set_status(2, ItemStatus::Fail).expect("item exists");
        store.set_all_status(ItemStatus::Ok);
        let stats = store.stats();
        assert_eq!(stats.count(ItemStatus::Ok), stats.total);
        assert_eq!(stats.fail, 0);
        assert_eq!(stats.pending, 0);
    }

    #[test]
    fn per_item_edits_report_missing_ids() {
        let mut store = ChecklistStore::standard();
        store.set_note(4, "Ruido en motor").expect("item exists");
        store.set_photo(4, vec![1, 2, 3]).expect("item exists");
        assert_eq!(store.get(4).and_then(|item| item.observation()), Some("Ruido en motor"));
        store.clear_photo(4).expect("item exists");
        assert!(store.get(4).expect("item").photo.is_none());
        assert_eq!(
            store.set_status(42, ItemStatus::Ok).unwrap_err(),
            ChecklistError::ItemNotFound(42)
        );
    }

    #[test]
    fn initialize_replaces_contents() {
        let mut store = ChecklistStore::standard();
        store.initialize(ChecklistSource::MasterData(vec![MasterDataRow::new(
            Category::Critical,
            "Sala de Bombas",
            "Check",
        )]));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(1).expect("item").task, "Check");
    }
}
