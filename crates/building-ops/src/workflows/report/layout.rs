use super::snapshot::ReportSnapshot;
use crate::workflows::checklist::{Category, ChecklistItem, Stats};
use crate::workflows::incidences::IncidenceRecord;
use chrono::NaiveDate;

pub const REPORT_TITLE: &str = "INFORME DE GESTIÓN / CONTROL DE INSTALACIONES";
pub const CHECKLIST_SECTION: &str = "CHECKLIST TÉCNICO";
pub const REQUIREMENTS_SECTION: &str = "REQUERIMIENTOS / COMPRAS";
pub const INCIDENCES_SECTION: &str = "INCIDENCIAS RR.HH.";
pub const NO_UPDATES: &str = "Sin novedades.";
pub const NO_REQUIREMENTS: &str = "Sin requerimientos reportados.";
pub const NO_INCIDENCES: &str = "Sin incidencias registradas.";
pub const NO_PHOTO: &str = "Sin foto";
pub const INVALID_PHOTO: &str = "Foto inválida";

/// Format-independent building blocks of a report, in reading order.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportBlock<'a> {
    Title {
        title: &'static str,
        community: &'a str,
        date: NaiveDate,
    },
    Summary(Stats),
    Section {
        number: u8,
        title: &'static str,
    },
    Category {
        category: Category,
        items: Vec<&'a ChecklistItem>,
    },
    Paragraph(&'a str),
    Incidences(Vec<&'a IncidenceRecord>),
}

#[derive(Debug, Clone)]
pub struct ReportDocument<'a> {
    blocks: Vec<ReportBlock<'a>>,
}

impl<'a> ReportDocument<'a> {
    pub fn from_snapshot(snapshot: &'a ReportSnapshot) -> Self {
        let mut blocks = vec![
            ReportBlock::Title {
                title: REPORT_TITLE,
                community: &snapshot.community_name,
                date: snapshot.report_date,
            },
            ReportBlock::Summary(snapshot.stats()),
            ReportBlock::Section {
                number: 1,
                title: CHECKLIST_SECTION,
            },
        ];

        for category in Category::ordered() {
            blocks.push(ReportBlock::Category {
                category,
                items: snapshot.items_in(category),
            });
        }

        blocks.push(ReportBlock::Section {
            number: 2,
            title: REQUIREMENTS_SECTION,
        });
        blocks.push(ReportBlock::Paragraph(
            snapshot.requirements().unwrap_or(NO_REQUIREMENTS),
        ));

        blocks.push(ReportBlock::Section {
            number: 3,
            title: INCIDENCES_SECTION,
        });
        if snapshot.incidences.is_empty() {
            blocks.push(ReportBlock::Paragraph(NO_INCIDENCES));
        } else {
            blocks.push(ReportBlock::Incidences(snapshot.incidences.iter().collect()));
        }

        Self { blocks }
    }

    pub fn blocks(&self) -> &[ReportBlock<'a>] {
        &self.blocks
    }

    /// Items carrying a photo, in report order.
    pub fn photo_items(&self) -> Vec<&'a ChecklistItem> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                ReportBlock::Category { items, .. } => Some(items),
                _ => None,
            })
            .flatten()
            .copied()
            .filter(|item| item.photo.is_some())
            .collect()
    }
}

pub fn summary_line(stats: &Stats) -> String {
    format!(
        "RESUMEN: OK={} | FALLAS={} | PENDIENTES={} | TOTAL={}",
        stats.ok, stats.fail, stats.pending, stats.total
    )
}

pub fn observation_or_placeholder(item: &ChecklistItem) -> &str {
    item.observation().unwrap_or(NO_UPDATES)
}

pub fn item_line(item: &ChecklistItem) -> String {
    format!(
        "- {} {} ({}): {}",
        item.status.badge(),
        item.name,
        item.task,
        observation_or_placeholder(item)
    )
}

pub fn incidence_line(record: &IncidenceRecord) -> String {
    format!(
        "- {} | {}: {}",
        record.formatted_timestamp(),
        record.employee,
        record.detail
    )
}
