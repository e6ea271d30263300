use super::parser::{INSTALLATION_COLUMN, TASK_COLUMN, TYPE_COLUMN};
use crate::workflows::checklist::{Category, MasterDataRow};
use rust_xlsxwriter::{DataValidation, Format, Workbook, XlsxError};

pub(crate) const SHEET_NAME: &str = "Maestro";

// Rows below the header that accept only the fixed category labels.
const VALIDATED_ROWS: u32 = 1000;

pub(crate) fn build_workbook(rows: &[MasterDataRow]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, title) in [TYPE_COLUMN, INSTALLATION_COLUMN, TASK_COLUMN]
        .into_iter()
        .enumerate()
    {
        worksheet.write_string_with_format(0, col as u16, title, &header_format)?;
    }

    for (index, row) in rows.iter().enumerate() {
        let line = index as u32 + 1;
        worksheet.write_string(line, 0, row.category.label())?;
        worksheet.write_string(line, 1, row.name.as_str())?;
        worksheet.write_string(line, 2, row.task.as_str())?;
    }

    worksheet.set_column_width(0, 16)?;
    worksheet.set_column_width(1, 28)?;
    worksheet.set_column_width(2, 36)?;

    let labels = Category::ordered().map(Category::label);
    let validation = DataValidation::new().allow_list_strings(&labels)?;
    worksheet.add_data_validation(1, 0, VALIDATED_ROWS, 0, &validation)?;

    workbook.save_to_buffer()
}
