//! Export of filtered rows to an `.xlsx` workbook.

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::error::DashboardError;
use crate::models::{Attribute, Dataset};


/// Name of the sheet holding exported rows.
pub const EXPORT_SHEET_NAME: &str = "Dados filtrados";

const DATE_COLUMN_WIDTH: f64 = 12.0;


/// Write the dataset to an `.xlsx` file.
pub fn write_xlsx(dataset: &Dataset, path: &Path) -> Result<(), DashboardError> {
    let mut workbook = build_workbook(dataset).map_err(export_error)?;
    workbook.save(path).map_err(export_error)
}


/// Render the dataset as `.xlsx` bytes, for callers serving a download.
pub fn to_xlsx_buffer(dataset: &Dataset) -> Result<Vec<u8>, DashboardError> {
    let mut workbook = build_workbook(dataset).map_err(export_error)?;
    workbook.save_to_buffer().map_err(export_error)
}


fn export_error(e: XlsxError) -> DashboardError {
    DashboardError::Export(e.to_string())
}


fn build_workbook(dataset: &Dataset) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(EXPORT_SHEET_NAME)?;

    let header_format = Format::new().set_bold();
    let date_format = Format::new().set_num_format("dd/mm/yyyy");
    let amount_format = Format::new().set_num_format("#,##0.00");

    let columns = dataset.schema().attributes();

    // Header row
    for (col, attribute) in columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, attribute.column(), &header_format)?;
        if *attribute == Attribute::Day {
            worksheet.set_column_width(col as u16, DATE_COLUMN_WIDTH)?;
        }
    }

    // Data rows
    for (index, record) in dataset.records().iter().enumerate() {
        let row = (index + 1) as u32;
        for (col, attribute) in columns.iter().enumerate() {
            let col = col as u16;
            match attribute {
                Attribute::Manager => {
                    worksheet.write_string(row, col, &record.manager)?;
                }
                Attribute::Year => {
                    worksheet.write_number(row, col, record.year)?;
                }
                Attribute::Month => {
                    if let Some(month) = &record.month {
                        worksheet.write_string(row, col, month)?;
                    }
                }
                Attribute::Day => {
                    if let Some(day) = &record.day {
                        worksheet.write_datetime_with_format(row, col, day, &date_format)?;
                    }
                }
                Attribute::Category => {
                    worksheet.write_string(row, col, &record.category)?;
                }
                Attribute::Sale => {
                    worksheet.write_number_with_format(row, col, record.sale, &amount_format)?;
                }
            }
        }
    }

    Ok(workbook)
}
