use super::layout::ReportDocument;
use super::snapshot::ReportSnapshot;
use super::text::render_text;
use crate::workflows::checklist::{Category, ChecklistItemView, Stats};
use crate::workflows::incidences::IncidenceRecord;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CategoryView {
    pub category: Category,
    pub category_label: &'static str,
    pub items: Vec<ChecklistItemView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IncidenceView {
    pub id: u32,
    pub employee: String,
    pub detail: String,
    pub timestamp: String,
}

impl From<&IncidenceRecord> for IncidenceView {
    fn from(record: &IncidenceRecord) -> Self {
        Self {
            id: record.id,
            employee: record.employee.clone(),
            detail: record.detail.clone(),
            timestamp: record.formatted_timestamp(),
        }
    }
}

/// JSON summary of a report; photos appear only as `has_photo` flags.
#[derive(Debug, Clone, Serialize)]
pub struct ReportView {
    pub community_name: String,
    pub report_date: NaiveDate,
    pub file_stem: String,
    pub stats: Stats,
    pub categories: Vec<CategoryView>,
    pub needs: Option<String>,
    pub incidences: Vec<IncidenceView>,
    pub text: String,
}

impl ReportSnapshot {
    pub fn to_view(&self) -> ReportView {
        let categories = Category::ordered()
            .into_iter()
            .map(|category| CategoryView {
                category,
                category_label: category.label(),
                items: self
                    .items_in(category)
                    .into_iter()
                    .map(|item| item.to_view())
                    .collect(),
            })
            .collect();

        let incidences = self.incidences.iter().map(IncidenceView::from).collect();

        ReportView {
            community_name: self.community_name.clone(),
            report_date: self.report_date,
            file_stem: self.file_stem(),
            stats: self.stats(),
            categories,
            needs: self.requirements().map(str::to_string),
            incidences,
            text: render_text(&ReportDocument::from_snapshot(self)),
        }
    }
}
