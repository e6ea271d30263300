use super::mapping::normalize_category;
use super::normalizer::fold_label;
use super::MasterDataError;
use crate::workflows::checklist::domain::task_or_placeholder;
use crate::workflows::checklist::MasterDataRow;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;

pub(crate) type Table = Vec<Vec<String>>;

pub const TYPE_COLUMN: &str = "Type";
pub const INSTALLATION_COLUMN: &str = "Installation";
pub const TASK_COLUMN: &str = "Task";

const TYPE_ALIASES: &[&str] = &["type", "tipo", "categoria", "category"];
const INSTALLATION_ALIASES: &[&str] = &["installation", "instalacion", "nombre", "name"];
const TASK_ALIASES: &[&str] = &["task", "tarea"];

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xd0, 0xcf, 0x11, 0xe0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SourceFormat {
    Spreadsheet,
    Csv,
}

pub(crate) fn detect_format(bytes: &[u8]) -> SourceFormat {
    if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) {
        SourceFormat::Spreadsheet
    } else {
        SourceFormat::Csv
    }
}

/// Every worksheet of the workbook, in workbook order.
pub(crate) fn spreadsheet_tables(bytes: &[u8]) -> Result<Vec<Table>, MasterDataError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let mut tables = Vec::new();

    for name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&name)?;
        let table: Table = range
            .rows()
            .map(|row| row.iter().map(cell_text).collect())
            .collect();
        tables.push(table);
    }

    Ok(tables)
}

pub(crate) fn csv_table(bytes: &[u8]) -> Result<Table, MasterDataError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);
    let mut table = Vec::new();

    for record in reader.records() {
        let record = record?;
        table.push(record.iter().map(str::to_string).collect());
    }

    Ok(table)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(value) => value.clone(),
        Data::Float(value) if value.fract() == 0.0 => format!("{}", *value as i64),
        other => other.to_string(),
    }
}

/// Column positions resolved from a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HeaderMap {
    pub(crate) row: usize,
    pub(crate) category: usize,
    pub(crate) name: usize,
    pub(crate) task: Option<usize>,
}

/// Resolves required columns from the first non-empty row, or lists the
/// required columns it lacks.
pub(crate) fn locate_header(table: &Table) -> Result<HeaderMap, Vec<&'static str>> {
    let Some((row, cells)) = table
        .iter()
        .enumerate()
        .find(|(_, cells)| cells.iter().any(|cell| !cell.trim().is_empty()))
    else {
        return Err(vec![TYPE_COLUMN, INSTALLATION_COLUMN]);
    };

    let folded: Vec<String> = cells.iter().map(|cell| fold_label(cell)).collect();
    let category = column_position(&folded, TYPE_ALIASES);
    let name = column_position(&folded, INSTALLATION_ALIASES);
    let task = column_position(&folded, TASK_ALIASES);

    match (category, name) {
        (Some(category), Some(name)) => Ok(HeaderMap {
            row,
            category,
            name,
            task,
        }),
        (category, name) => {
            let mut missing = Vec::new();
            if category.is_none() {
                missing.push(TYPE_COLUMN);
            }
            if name.is_none() {
                missing.push(INSTALLATION_COLUMN);
            }
            Err(missing)
        }
    }
}

fn column_position(folded: &[String], aliases: &[&str]) -> Option<usize> {
    folded
        .iter()
        .position(|header| aliases.iter().any(|alias| header.as_str() == *alias))
}

/// Data rows below the header, skipping rows without a type or installation.
pub(crate) fn rows_from_table(table: &Table, header: HeaderMap) -> Vec<MasterDataRow> {
    table
        .iter()
        .skip(header.row + 1)
        .filter_map(|cells| {
            let cell = |index: usize| cells.get(index).map(|value| value.trim()).unwrap_or("");
            let category = cell(header.category);
            let name = cell(header.name);
            if category.is_empty() || name.is_empty() {
                return None;
            }

            let task = header.task.map(cell);
            Some(MasterDataRow::new(
                normalize_category(category),
                name,
                task_or_placeholder(task),
            ))
        })
        .collect()
}
