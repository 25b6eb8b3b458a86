use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::SpreadsheetError;
use std::collections::HashSet;

/// A sheet whose first used row names the columns.
#[derive(Clone, Debug)]
pub struct Table {
    /// Source file name
    pub file_name: String,
    /// Sheet name
    pub sheet_name: String,
    /// Column names in sheet order
    pub columns: Vec<String>,
    /// Data rows below the header
    pub rows: Vec<Row>,
}

/// One data row; null cells are `None`.
#[derive(Clone, Debug)]
pub struct Row {
    /// 1-based row number as shown by spreadsheet applications
    pub number: usize,
    pub cells: Vec<Option<Cell>>,
}

impl Row {
    /// Gets the cell at a column index, `None` when null or out of range.
    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index).and_then(Option::as_ref)
    }

    /// Returns true when every cell in the row is null.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }
}

impl Table {
    /// Builds a table from a sheet, treating cells matching `nulls` as missing.
    pub fn from_sheet(sheet: &Sheet, nulls: &HashSet<String>) -> Result<Table, SpreadsheetError> {
        let mut rows = sheet.rows().into_iter();
        let (header_row, header) = rows.next().ok_or_else(|| SpreadsheetError::MissingHeaderRow(
            sheet.file_name.to_owned(),
            sheet.name.to_owned(),
        ))?;
        let col_lower = sheet.col_origin();

        // Columns without a header name are left out of the table.
        let mut columns = Vec::<String>::with_capacity(header.len());
        let mut offsets = Vec::<usize>::with_capacity(header.len());
        let mut seen = HashSet::<String>::new();
        for (offset, cell) in header.iter().enumerate() {
            let name = match cell.filter(|cell| !cell.is_null(nulls)).map(|cell| cell.to_text()) {
                Some(name) if !name.is_empty() => name,
                _ => continue,
            };
            if !seen.insert(name.to_owned()) {
                Err(SpreadsheetError::DuplicateHeaderColumn(
                    sheet.file_name.to_owned(),
                    sheet.name.to_owned(),
                    name.to_owned(),
                ))?
            }
            columns.push(name);
            offsets.push(offset);
        }
        if columns.is_empty() {
            Err(SpreadsheetError::MissingHeaderRow(sheet.file_name.to_owned(), sheet.name.to_owned()))?
        }

        let rows = rows
            .map(|(row, record)| {
                for (offset, cell) in record.iter().enumerate() {
                    if let Some(cell) = cell.filter(|cell| !offsets.contains(&offset) && !cell.is_null(nulls)) {
                        log::debug!(
                            "Skip cell {} of sheet '{}': column {} has no header",
                            cell.reference(),
                            sheet.name,
                            index_to_reference(header_row, col_lower + offset)
                        );
                    }
                }
                Row {
                    number: row + 1,
                    cells: offsets
                        .iter()
                        .map(|offset| record[*offset].filter(|cell| !cell.is_null(nulls)).cloned())
                        .collect(),
                }
            })
            .collect::<Vec<Row>>();

        log::debug!(
            "Sheet '{}' of '{}': {} columns, {} rows",
            sheet.name,
            sheet.file_name,
            columns.len(),
            rows.len()
        );
        Ok(Table {
            file_name: sheet.file_name.to_owned(),
            sheet_name: sheet.name.to_owned(),
            columns,
            rows,
        })
    }

    /// Gets the index of a column by exact (trimmed) name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name.trim())
    }

    /// Gets the index of a column that must exist.
    pub fn require_column(&self, name: &str) -> Result<usize, SpreadsheetError> {
        self.column_index(name).ok_or_else(|| SpreadsheetError::MissingColumn(
            self.file_name.to_owned(),
            self.sheet_name.to_owned(),
            name.to_owned(),
        ))
    }
}
