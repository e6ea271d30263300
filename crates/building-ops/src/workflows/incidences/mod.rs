//! HR incidence log: timestamped notes about named employees.

use chrono::{Local, NaiveDateTime};
use serde::Serialize;

/// Display format shared by the log views and every report renderer.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncidenceRecord {
    pub id: u32,
    pub employee: String,
    pub detail: String,
    pub timestamp: NaiveDateTime,
}

impl IncidenceRecord {
    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IncidenceError {
    #[error("employee name must not be empty")]
    EmptyEmployee,
    #[error("incidence detail must not be empty")]
    EmptyDetail,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncidenceLog {
    records: Vec<IncidenceRecord>,
}

impl IncidenceLog {
    pub fn add(&mut self, employee: &str, detail: &str) -> Result<&IncidenceRecord, IncidenceError> {
        self.add_at(employee, detail, Local::now().naive_local())
    }

    pub fn add_at(
        &mut self,
        employee: &str,
        detail: &str,
        timestamp: NaiveDateTime,
    ) -> Result<&IncidenceRecord, IncidenceError> {
        let employee = employee.trim();
        if employee.is_empty() {
            return Err(IncidenceError::EmptyEmployee);
        }
        let detail = detail.trim();
        if detail.is_empty() {
            return Err(IncidenceError::EmptyDetail);
        }

        let id = self.records.iter().map(|record| record.id).max().unwrap_or(0) + 1;
        self.records.push(IncidenceRecord {
            id,
            employee: employee.to_string(),
            detail: detail.to_string(),
            timestamp,
        });
        Ok(&self.records[self.records.len() - 1])
    }

    /// Deletes the record with `id`; returns false when there was none.
    pub fn remove(&mut self, id: u32) -> bool {
        let before = self.records.len();
        self.records.retain(|record| record.id != id);
        self.records.len() != before
    }

    /// Newest first. Records sharing a timestamp keep insertion recency.
    pub fn list_sorted(&self) -> Vec<&IncidenceRecord> {
        let mut sorted: Vec<&IncidenceRecord> = self.records.iter().collect();
        sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        sorted
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
