mod catalog;
pub mod domain;
mod store;

pub use catalog::{standard_catalog, MasterDataRow};
pub use domain::{
    Category, ChecklistError, ChecklistItem, ChecklistItemView, ItemStatus, Stats,
    TASK_PLACEHOLDER,
};
pub use store::{ChecklistSource, ChecklistStore};
