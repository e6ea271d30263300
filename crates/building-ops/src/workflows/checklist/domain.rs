use serde::{Deserialize, Serialize};

/// Placeholder used whenever an item carries no task description.
pub const TASK_PLACEHOLDER: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Critical,
    Access,
    Hygiene,
    Common,
    Infrastructure,
}

impl Category {
    /// Order used by every grouped listing and report section.
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Critical,
            Self::Access,
            Self::Hygiene,
            Self::Common,
            Self::Infrastructure,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Critical => "Críticos",
            Self::Access => "Accesos",
            Self::Hygiene => "Higiene",
            Self::Common => "Comunes",
            Self::Infrastructure => "Infra",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    #[default]
    Pending,
    Ok,
    Fail,
}

impl ItemStatus {
    /// Badge shown in the plain-text report.
    pub const fn badge(self) -> &'static str {
        match self {
            Self::Ok => "🟢 OK",
            Self::Fail => "🔴 FALLA",
            Self::Pending => "⚪ PEND.",
        }
    }

    /// Glyph-free label for documents rendered with built-in fonts.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Fail => "FALLA",
            Self::Pending => "PEND.",
        }
    }

    pub const fn accent_rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Ok => (0x16, 0xa3, 0x4a),
            Self::Fail => (0xdc, 0x26, 0x26),
            Self::Pending => (0x64, 0x74, 0x8b),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistItem {
    pub id: u32,
    pub category: Category,
    pub name: String,
    pub task: String,
    pub status: ItemStatus,
    pub note: String,
    pub photo: Option<Vec<u8>>,
}

impl ChecklistItem {
    pub(crate) fn new(id: u32, category: Category, name: &str, task: Option<&str>) -> Self {
        Self {
            id,
            category,
            name: name.to_string(),
            task: task_or_placeholder(task),
            status: ItemStatus::Pending,
            note: String::new(),
            photo: None,
        }
    }

    /// Trimmed note, `None` when nothing was observed.
    pub fn observation(&self) -> Option<&str> {
        let note = self.note.trim();
        if note.is_empty() {
            None
        } else {
            Some(note)
        }
    }
}

/// JSON projection of an item; photo bytes are reported as a flag only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistItemView {
    pub id: u32,
    pub category: Category,
    pub category_label: &'static str,
    pub name: String,
    pub task: String,
    pub status: ItemStatus,
    pub status_label: &'static str,
    pub note: String,
    pub has_photo: bool,
}

impl ChecklistItem {
    pub fn to_view(&self) -> ChecklistItemView {
        ChecklistItemView {
            id: self.id,
            category: self.category,
            category_label: self.category.label(),
            name: self.name.clone(),
            task: self.task.clone(),
            status: self.status,
            status_label: self.status.label(),
            note: self.note.clone(),
            has_photo: self.photo.is_some(),
        }
    }
}

pub(crate) fn task_or_placeholder(task: Option<&str>) -> String {
    match task.map(str::trim) {
        Some(task) if !task.is_empty() => task.to_string(),
        _ => TASK_PLACEHOLDER.to_string(),
    }
}

/// Status totals, recomputed on every read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub ok: usize,
    pub fail: usize,
    pub pending: usize,
    pub total: usize,
}

impl Stats {
    pub fn from_items<'a, I>(items: I) -> Self
    where
        I: IntoIterator<Item = &'a ChecklistItem>,
    {
        items.into_iter().fold(Self::default(), |mut stats, item| {
            match item.status {
                ItemStatus::Ok => stats.ok += 1,
                ItemStatus::Fail => stats.fail += 1,
                ItemStatus::Pending => stats.pending += 1,
            }
            stats.total += 1;
            stats
        })
    }

    pub fn count(&self, status: ItemStatus) -> usize {
        match status {
            ItemStatus::Ok => self.ok,
            ItemStatus::Fail => self.fail,
            ItemStatus::Pending => self.pending,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChecklistError {
    #[error("installation name must not be empty")]
    EmptyName,
    #[error("checklist item {0} not found")]
    ItemNotFound(u32),
}
