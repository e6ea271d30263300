//! Master-data catalog exchange: spreadsheet/CSV import into a checklist
//! store and template export.

mod mapping;
mod normalizer;
mod parser;
mod template;

use crate::workflows::checklist::{
    standard_catalog, ChecklistSource, ChecklistStore, MasterDataRow,
};
use parser::SourceFormat;
use std::path::Path;
use tracing::{info, warn};

pub use parser::{INSTALLATION_COLUMN, TASK_COLUMN, TYPE_COLUMN};

/// File name offered when a catalog workbook is downloaded.
pub const MASTER_DATA_FILE_NAME: &str = "plantilla_maestro.xlsx";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, thiserror::Error)]
pub enum MasterDataError {
    #[error("failed to read master data file: {0}")]
    Io(#[from] std::io::Error),
    #[error("unreadable master data workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("invalid master data CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("master data workbook has no worksheets")]
    EmptyWorkbook,
    #[error("master data header is missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<&'static str>),
    #[error(
        "master data has no valid rows ({} and {} are required)",
        TYPE_COLUMN,
        INSTALLATION_COLUMN
    )]
    NoValidRows,
    #[error("failed to build master data workbook: {0}")]
    Template(#[from] rust_xlsxwriter::XlsxError),
}

impl MasterDataError {
    /// Input the user can fix by editing the file, as opposed to a file that
    /// could not be read at all.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            MasterDataError::MissingColumns(_) | MasterDataError::NoValidRows
        )
    }
}

pub struct MasterDataImporter;

impl MasterDataImporter {
    /// Parses a spreadsheet (XLSX/XLS/ODS) or CSV payload into catalog rows.
    pub fn parse(bytes: &[u8]) -> Result<Vec<MasterDataRow>, MasterDataError> {
        let tables = match parser::detect_format(bytes) {
            SourceFormat::Spreadsheet => parser::spreadsheet_tables(bytes)?,
            SourceFormat::Csv => vec![parser::csv_table(bytes)?],
        };

        let mut first_missing = None;
        for table in &tables {
            match parser::locate_header(table) {
                Ok(header) => {
                    let rows = parser::rows_from_table(table, header);
                    if rows.is_empty() {
                        return Err(MasterDataError::NoValidRows);
                    }
                    return Ok(rows);
                }
                Err(missing) => {
                    first_missing.get_or_insert(missing);
                }
            }
        }

        match first_missing {
            Some(missing) => Err(MasterDataError::MissingColumns(missing)),
            None => Err(MasterDataError::EmptyWorkbook),
        }
    }

    /// Replaces the store's items with the parsed rows. On any error the
    /// store is left exactly as it was.
    pub fn import(bytes: &[u8], store: &mut ChecklistStore) -> Result<usize, MasterDataError> {
        let rows = Self::parse(bytes).map_err(|err| {
            warn!(error = %err, "master data import rejected");
            err
        })?;
        let count = rows.len();
        store.initialize(ChecklistSource::MasterData(rows));
        info!(items = count, "master data imported");
        Ok(count)
    }

    pub fn from_path<P: AsRef<Path>>(
        path: P,
        store: &mut ChecklistStore,
    ) -> Result<usize, MasterDataError> {
        let bytes = std::fs::read(path)?;
        Self::import(&bytes, store)
    }
}

/// Template workbook pre-filled with the built-in catalog.
pub fn export_template() -> Result<Vec<u8>, MasterDataError> {
    export_rows(&standard_catalog())
}

/// Workbook describing the given catalog rows, in the import layout.
pub fn export_rows(rows: &[MasterDataRow]) -> Result<Vec<u8>, MasterDataError> {
    Ok(template::build_workbook(rows)?)
}
