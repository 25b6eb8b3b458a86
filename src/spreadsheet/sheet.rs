use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::range::Range;
use crate::spreadsheet::table::Table;
use crate::spreadsheet::SpreadsheetError;
use std::collections::HashSet;

/// Represents a sheet from a spreadsheet file; cells are kept in row-major order.
#[derive(Clone, Debug)]
pub struct Sheet {
    /// Source file name
    pub file_name: String,
    /// Sheet name
    pub name: String,
    /// All non-empty cells in the sheet
    pub cells: Vec<Cell>,
    /// Expected data range (user-specified)
    pub(super) range: Range,
    /// Row limit for data extraction
    pub(super) limit: Option<usize>,
    /// Whether to skip empty rows
    pub(super) skip_empty_rows: bool,
    /// Actual data range (determined from cell data)
    pub row_lower_bound: Option<usize>,
    pub row_upper_bound: Option<usize>,
    pub col_lower_bound: Option<usize>,
    pub col_upper_bound: Option<usize>,
}

impl Sheet {
    /// Creates a new sheet with specified parameters.
    pub(crate) fn new(file_name: &str, name: &str, range: Option<Range>, limit: Option<usize>, skip_empty_rows: bool) -> Self {
        Self {
            file_name: file_name.to_owned(),
            name: name.to_owned(),
            cells: Vec::new(),
            range: range.unwrap_or_default(),
            limit,
            skip_empty_rows,
            row_lower_bound: None,
            row_upper_bound: None,
            col_lower_bound: None,
            col_upper_bound: None,
        }
    }

    /// Returns true if the sheet contains no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Checks if a row is before the lower bound of the specified range.
    pub(super) fn before_row_lower_bound(&self, row: usize) -> bool {
        self.range.row_lower_bound
            .map(|row_lower_bound| row < row_lower_bound)
            .unwrap_or(false)
    }

    /// Checks if a row is after the upper bound of the specified range or exceeds the row limit.
    pub(super) fn after_row_upper_bound(&self, row: usize) -> bool {
        let is_out_of_bound = self.range.row_upper_bound
            .map(|row_upper_bound| row_upper_bound < row)
            .unwrap_or(false);
        let is_more_than_limit = self.row_lower_bound.zip(self.limit)
            .map(|(row_lower_bound, limit)| row_lower_bound + limit <= row)
            .unwrap_or(false);
        is_out_of_bound || is_more_than_limit
    }

    /// Checks if a column is before the lower bound of the specified range.
    pub(super) fn before_col_lower_bound(&self, col: usize) -> bool {
        self.range.col_lower_bound
            .map(|col_lower_bound| col < col_lower_bound)
            .unwrap_or(false)
    }

    /// Checks if a column is after the upper bound of the specified range.
    pub(super) fn after_col_upper_bound(&self, col: usize) -> bool {
        self.range.col_upper_bound
            .map(|col_upper_bound| col_upper_bound < col)
            .unwrap_or(false)
    }

    /// Checks if a cell at (row, col) is within the specified range and limits.
    pub(super) fn contains(&self, row: usize, col: usize) -> bool {
        !self.before_row_lower_bound(row)
            && !self.after_row_upper_bound(row)
            && !self.before_col_lower_bound(col)
            && !self.after_col_upper_bound(col)
    }

    /// Checks whether accepting a cell on `row` would cross an empty row.
    pub(super) fn is_after_gap(&self, row: usize) -> bool {
        self.row_upper_bound
            .map(|row_upper_bound| row_upper_bound + 1 < row)
            .unwrap_or(false)
    }

    /// Adds a cell to the sheet, updating data ranges.
    pub(crate) fn push(&mut self, cell: Cell) {
        self.update_bound(cell.row, cell.col);
        self.cells.push(cell);
    }

    /// Updates the actual data range boundaries based on cell positions.
    fn update_bound(&mut self, row: usize, col: usize) {
        if self.row_lower_bound.is_none() { // First cell
            self.row_lower_bound = Some(row);
        }
        if self.col_lower_bound.map(|col_lower_bound| col < col_lower_bound).unwrap_or(true) {
            self.col_lower_bound = Some(col);
        }
        if self.col_upper_bound.map(|col_upper_bound| col_upper_bound < col).unwrap_or(true) {
            self.col_upper_bound = Some(col);
        }
        self.row_upper_bound = Some(row);
    }

    /// First column of the dense layout produced by [`Sheet::rows`].
    pub(crate) fn col_origin(&self) -> usize {
        self.range.col_lower_bound.or(self.col_lower_bound).unwrap_or(0)
    }

    /// Lays the cells out as a dense table between the column bounds.
    ///
    /// Each entry is the 0-based sheet row with one slot per column. Rows without any cell
    /// are dropped when the sheet skips empty rows and kept as all-`None` otherwise.
    pub fn rows(&self) -> Vec<(usize, Vec<Option<&Cell>>)> {
        let (row_lower, row_upper) = match self.row_lower_bound.zip(self.row_upper_bound) {
            Some(bounds) => bounds,
            None => return Vec::new(),
        };
        let col_lower = self.col_origin();
        let col_upper = self.range.col_upper_bound.or(self.col_upper_bound).unwrap_or(col_lower);
        let width = col_upper + 1 - col_lower;

        let mut table = Vec::<(usize, Vec<Option<&Cell>>)>::new();
        let mut cells = self.cells.iter().peekable();
        for row in row_lower..=row_upper {
            let mut record = vec![None; width];
            let mut has_cell = false;
            while let Some(cell) = cells.next_if(|cell| cell.row == row) {
                if (col_lower..=col_upper).contains(&cell.col) {
                    record[cell.col - col_lower] = Some(cell);
                    has_cell = true;
                }
            }
            if has_cell || !self.skip_empty_rows {
                table.push((row, record));
            }
        }
        table
    }

    /// Converts the sheet to a table whose first used row is the header.
    pub fn table(&self, nulls: &HashSet<String>) -> Result<Table, SpreadsheetError> {
        Table::from_sheet(self, nulls)
    }
}
