//! # Spreadsheet Reading Module
//!
//! Reads the vehicle workbook as rows with named columns. Office Open XML workbooks
//! (`.xlsx`, `.xlsm`) are parsed straight from their zip package; `.csv` files are read
//! as a workbook holding a single sheet named after the file.
use crate::error::QuoteError;
use crate::helpers::reader::resolve_local_path;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::sheet::Sheet;
use std::ffi::OsStr;
use thiserror::Error;

pub mod cell;
pub mod criteria;
pub mod csv;
pub(crate) mod excel;
pub mod range;
pub mod reference;
pub mod sheet;
pub mod table;
pub mod xlsx;

/// Errors raised while reading a workbook.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Cannot detect file format for '{0}', expected .xlsx, .xlsm or .csv")]
    InvalidFileFormat(String),

    #[error("Missing '{0}' in workbook package")]
    FileError(String),

    #[error("Spreadsheet '{0}' is password protected")]
    SpreadsheetPasswordProtectedError(String),

    #[error("Spreadsheet '{0}' has no sheets")]
    SpreadsheetEmptyError(String),

    #[error("No sheet of '{0}' matches '{1}'")]
    SheetNotFound(String, String),

    #[error("Error value in '{0}' sheet '{1}' at {2}: '{3}'")]
    CellValueError(String, String, String, String),

    #[error("Shared string index {3} out of range in '{0}' sheet '{1}' at {2}")]
    SharedStringIndexError(String, String, String, usize),

    #[error("Sheet '{1}' of '{0}' has no header row")]
    MissingHeaderRow(String, String),

    #[error("Duplicate column name '{2}' in '{0}' sheet '{1}'")]
    DuplicateHeaderColumn(String, String, String),

    #[error("Column '{2}' not found in '{0}' sheet '{1}'")]
    MissingColumn(String, String, String),
}

/// A workbook opened for reading.
pub trait Spreadsheet {
    /// Returns the file name of this spreadsheet
    fn name(&self) -> String;

    /// Returns the sheet names in workbook order
    fn sheet_names(&self) -> Vec<String>;

    /// Reads the sheets accepted by the criteria, in workbook order
    fn read_sheets(&mut self, criteria: &Criteria) -> Result<Vec<Sheet>, QuoteError>;
}

/// Opens a workbook, choosing the reader from the file extension.
///
/// # Arguments
/// * `file_name` - Local path or `file://` URL
pub fn open_spreadsheet(file_name: &str) -> Result<Box<dyn Spreadsheet>, QuoteError> {
    let path = resolve_local_path(file_name)?;
    let extension = path.extension()
        .and_then(OsStr::to_str)
        .map(|extension| extension.to_ascii_lowercase());
    match extension.as_deref() {
        Some("xlsx") | Some("xlsm") => Ok(Box::new(xlsx::XlsxSpreadsheet::open(file_name)?)),
        Some("csv") => Ok(Box::new(csv::CsvSpreadsheet::open(file_name)?)),
        _ => Err(SpreadsheetError::InvalidFileFormat(file_name.to_owned()))?,
    }
}

/// Reads the first sheet accepted by the criteria.
pub fn read_first_sheet(spreadsheet: &mut dyn Spreadsheet, criteria: &Criteria) -> Result<Option<Sheet>, QuoteError> {
    let criteria = Criteria {
        sheet_limit: Some(1),
        ..criteria.clone()
    };
    Ok(spreadsheet.read_sheets(&criteria)?.into_iter().next())
}
