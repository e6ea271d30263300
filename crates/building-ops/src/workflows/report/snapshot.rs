use crate::config::ReportConfig;
use crate::workflows::checklist::{Category, ChecklistItem, ChecklistStore, Stats};
use crate::workflows::incidences::{IncidenceLog, IncidenceRecord};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Scalar fields a session edits alongside its stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFields {
    pub community_name: String,
    pub report_date: NaiveDate,
    #[serde(default)]
    pub needs: String,
}

impl ReportFields {
    pub fn new(community_name: impl Into<String>, report_date: NaiveDate) -> Self {
        Self {
            community_name: community_name.into(),
            report_date,
            needs: String::new(),
        }
    }

    pub fn from_config(config: &ReportConfig, report_date: NaiveDate) -> Self {
        Self::new(config.community_name.clone(), report_date)
    }
}

/// One consistent read of a session's stores. Renderers only ever see this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSnapshot {
    pub community_name: String,
    pub report_date: NaiveDate,
    pub needs: String,
    pub items: Vec<ChecklistItem>,
    /// Newest first.
    pub incidences: Vec<IncidenceRecord>,
}

impl ReportSnapshot {
    pub fn capture(
        checklist: &ChecklistStore,
        incidences: &IncidenceLog,
        fields: &ReportFields,
    ) -> Self {
        Self {
            community_name: fields.community_name.trim().to_string(),
            report_date: fields.report_date,
            needs: fields.needs.clone(),
            items: checklist.items().to_vec(),
            incidences: incidences.list_sorted().into_iter().cloned().collect(),
        }
    }

    pub fn stats(&self) -> Stats {
        Stats::from_items(&self.items)
    }

    pub fn items_in(&self, category: Category) -> Vec<&ChecklistItem> {
        self.items
            .iter()
            .filter(|item| item.category == category)
            .collect()
    }

    /// Trimmed requirements text, `None` when nothing was reported.
    pub fn requirements(&self) -> Option<&str> {
        let needs = self.needs.trim();
        if needs.is_empty() {
            None
        } else {
            Some(needs)
        }
    }

    /// `informe_<community>_<date>`, shared by every exported file.
    pub fn file_stem(&self) -> String {
        let slug = slugify(&self.community_name);
        if slug.is_empty() {
            format!("informe_{}", self.report_date)
        } else {
            format!("informe_{}_{}", slug, self.report_date)
        }
    }
}

fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    for c in value.trim().chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    slug.trim_matches('_').to_string()
}
