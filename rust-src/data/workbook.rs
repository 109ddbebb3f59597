//! Spreadsheet loader for the sales sheet.

use std::collections::HashMap;
use std::path::PathBuf;

use calamine::{open_workbook_auto, Data, DataType, Reader};
use chrono::{Duration, NaiveDate};
use tracing::{info, warn};

use crate::config::{DEFAULT_ROW_LIMIT, DEFAULT_SHEET_NAME, DEFAULT_WORKBOOK};
use crate::error::DashboardError;
use crate::models::{Attribute, Dataset, SaleRecord, Schema};


/// Where and how to read the sales sheet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadOptions {
    pub path: PathBuf,
    pub sheet: String,
    /// Maximum number of data rows read below the header.
    pub row_limit: usize,
    /// Column allow-list. Required columns are always read.
    pub columns: Vec<Attribute>,
}


impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_WORKBOOK),
            sheet: DEFAULT_SHEET_NAME.to_string(),
            row_limit: DEFAULT_ROW_LIMIT,
            columns: Attribute::ALL.to_vec(),
        }
    }
}


impl LoadOptions {
    pub fn new(path: impl Into<PathBuf>, sheet: &str) -> Self {
        Self {
            path: path.into(),
            sheet: sheet.to_string(),
            ..Default::default()
        }
    }

    pub fn with_row_limit(mut self, row_limit: usize) -> Self {
        self.row_limit = row_limit;
        self
    }

    pub fn with_columns(mut self, columns: impl IntoIterator<Item = Attribute>) -> Self {
        self.columns = columns.into_iter().collect();
        self
    }

    fn allows(&self, attribute: Attribute) -> bool {
        attribute.is_required() || self.columns.contains(&attribute)
    }
}


/// Load the sales sheet into a `Dataset`.
///
/// The first row is the header. Rows whose mandatory cells cannot be coerced
/// are skipped and counted; fully empty rows are ignored.
pub fn load_workbook(options: &LoadOptions) -> Result<Dataset, DashboardError> {
    let path = &options.path;

    if !path.exists() {
        return Err(DashboardError::load_failure(path, "file not found"));
    }

    let mut workbook = open_workbook_auto(path).map_err(|e| DashboardError::load_failure(path, e))?;

    let range = workbook
        .worksheet_range(&options.sheet)
        .map_err(|e| DashboardError::load_failure(path, format!("sheet '{}': {e}", options.sheet)))?;

    let header_row = range.start().map_or(0, |(row, _)| row as usize);
    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| DashboardError::load_failure(path, format!("sheet '{}' is empty", options.sheet)))?;

    let columns = resolve_columns(header, options).map_err(|reason| DashboardError::load_failure(path, reason))?;
    let schema = Schema::new(columns.keys().copied());

    let mut records = Vec::new();
    let mut skipped = 0;

    for (index, row) in rows.take(options.row_limit).enumerate() {
        if row.iter().all(|cell| cell.is_empty()) {
            continue;
        }

        match parse_row(row, &columns) {
            Ok(record) => records.push(record),
            Err(reason) => {
                warn!(row = sheet_row(header_row, index), "skipping row: {reason}");
                skipped += 1;
            }
        }
    }

    info!(
        path = %path.display(),
        sheet = %options.sheet,
        rows = records.len(),
        skipped,
        "loaded dataset"
    );

    Ok(Dataset::new(schema, records).with_skipped_rows(skipped))
}


/// One-based sheet row number of the `index`-th data row below the header.
fn sheet_row(header_row: usize, index: usize) -> usize {
    header_row + index + 2
}


/// Map allowed header names to column indexes.
fn resolve_columns(header: &[Data], options: &LoadOptions) -> Result<HashMap<Attribute, usize>, String> {
    let mut columns = HashMap::new();

    for (index, cell) in header.iter().enumerate() {
        let Some(name) = text_cell(cell) else { continue };
        let Some(attribute) = Attribute::ALL
            .into_iter()
            .find(|a| a.column() == name.to_uppercase())
        else {
            continue;
        };

        if options.allows(attribute) {
            columns.entry(attribute).or_insert(index);
        }
    }

    for attribute in Attribute::REQUIRED {
        if !columns.contains_key(&attribute) {
            return Err(format!("missing required column '{}'", attribute.column()));
        }
    }

    Ok(columns)
}


/// Build one record from a data row.
fn parse_row(row: &[Data], columns: &HashMap<Attribute, usize>) -> Result<SaleRecord, String> {
    let cell = |attribute: Attribute| columns.get(&attribute).and_then(|&i| row.get(i));

    let manager = cell(Attribute::Manager)
        .and_then(text_cell)
        .ok_or("empty GERENTE")?;

    let year = match cell(Attribute::Year) {
        Some(data) => year_cell(data).ok_or_else(|| format!("ANO '{data}' is not a year"))?,
        None => return Err("empty ANO".to_string()),
    };

    let category = cell(Attribute::Category)
        .and_then(text_cell)
        .ok_or("empty CATEGORIA")?;

    let sale = match cell(Attribute::Sale) {
        Some(data) => amount_cell(data).ok_or_else(|| format!("VENDA '{data}' is not a number"))?,
        None => return Err("empty VENDA".to_string()),
    };

    Ok(SaleRecord {
        manager,
        year,
        month: cell(Attribute::Month).and_then(text_cell),
        day: cell(Attribute::Day).and_then(date_cell),
        category,
        sale,
    })
}


/// Read a cell as trimmed, non-empty text.
fn text_cell(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        _ => return None,
    };

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}


/// Coerce a year cell to an integer. Sheets often store whole numbers as floats.
fn year_cell(cell: &Data) -> Option<i32> {
    match cell {
        Data::Int(i) => i32::try_from(*i).ok(),
        Data::Float(f) => float_to_year(*f),
        Data::String(s) => {
            let s = s.trim();
            s.parse::<i32>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(float_to_year))
        }
        _ => None,
    }
}


fn float_to_year(f: f64) -> Option<i32> {
    if f.fract() == 0.0 && f >= i32::MIN as f64 && f <= i32::MAX as f64 {
        Some(f as i32)
    } else {
        None
    }
}


/// Read a sale amount. Text cells may use either `1.234,50` or `1,234.50`.
fn amount_cell(cell: &Data) -> Option<f64> {
    match cell {
        Data::Int(i) => Some(*i as f64),
        Data::Float(f) => Some(*f),
        Data::String(s) => parse_amount(s.trim()),
        _ => None,
    }
    .filter(|amount| amount.is_finite())
}


/// Parse a text amount, deciding the separators from the text itself.
///
/// With both `.` and `,` present the last one is the decimal separator and the
/// other groups thousands. A single separator is decimal; a repeated one groups
/// thousands. Anything else is rejected.
fn parse_amount(text: &str) -> Option<f64> {
    let dots = text.matches('.').count();
    let commas = text.matches(',').count();

    let (decimal, group) = match (dots, commas) {
        (0, 0) => return text.parse().ok(),
        (1, 0) => (Some('.'), None),
        (0, 1) => (Some(','), None),
        (_, 0) => (None, Some('.')),
        (0, _) => (None, Some(',')),
        _ if text.rfind('.') > text.rfind(',') => (Some('.'), Some(',')),
        _ => (Some(','), Some('.')),
    };

    let (whole, fraction) = match decimal {
        Some(separator) => text.rsplit_once(separator)?,
        None => (text, ""),
    };

    if decimal.is_some_and(|separator| whole.contains(separator)) {
        return None;
    }
    if !fraction.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let whole = match group {
        Some(separator) if whole.contains(separator) => ungroup(whole, separator)?,
        _ => whole.to_string(),
    };

    if fraction.is_empty() {
        whole.parse().ok()
    } else {
        format!("{whole}.{fraction}").parse().ok()
    }
}


/// Strip thousands separators, requiring groups of three digits after the first.
fn ungroup(whole: &str, separator: char) -> Option<String> {
    let (sign, digits) = match whole.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", whole),
    };

    let mut groups = digits.split(separator);
    let first = groups.next()?;
    if first.is_empty() || first.len() > 3 || !first.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    for group in groups {
        if group.len() != 3 || !group.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
    }

    Some(format!("{sign}{}", digits.replace(separator, "")))
}


/// Read a date cell stored as a date, an ISO string, a `dd/mm/yyyy` string or a serial number.
fn date_cell(cell: &Data) -> Option<NaiveDate> {
    match cell {
        Data::DateTime(_) => cell.as_date(),
        Data::DateTimeIso(s) => NaiveDate::parse_from_str(s.get(..10)?, "%Y-%m-%d").ok(),
        Data::String(s) => {
            let s = s.trim();
            NaiveDate::parse_from_str(s, "%d/%m/%Y")
                .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
                .ok()
        }
        Data::Float(f) => from_excel_serial(*f),
        Data::Int(i) => from_excel_serial(*i as f64),
        _ => None,
    }
}


/// Convert an Excel serial day number (1900 date system) to a date.
fn from_excel_serial(serial: f64) -> Option<NaiveDate> {
    if !(1.0..=2_958_465.0).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}
