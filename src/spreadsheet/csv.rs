use crate::error::QuoteError;
use crate::helpers::reader::resolve_local_path;
use crate::helpers::reader::UnifiedReader;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::Spreadsheet;
use std::io::Seek;
use std::io::SeekFrom;

/// A CSV file read as a workbook with a single sheet named after the file stem.
pub struct CsvSpreadsheet {
    /// File name of the spreadsheet
    pub name: String,
    /// Name of the only sheet
    sheet_name: String,
    reader: UnifiedReader,
}

impl CsvSpreadsheet {
    /// Opens a CSV file from a local path or `file://` URL
    pub fn open(file_name: &str) -> Result<CsvSpreadsheet, QuoteError> {
        let sheet_name = resolve_local_path(file_name)?
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| file_name.to_owned());
        Ok(CsvSpreadsheet {
            name: file_name.to_owned(),
            sheet_name,
            reader: UnifiedReader::new(file_name)?,
        })
    }

    /// Wraps CSV content held in memory
    pub fn from_bytes(name: &str, sheet_name: &str, bytes: Vec<u8>) -> CsvSpreadsheet {
        CsvSpreadsheet {
            name: name.to_owned(),
            sheet_name: sheet_name.to_owned(),
            reader: UnifiedReader::from_bytes(bytes),
        }
    }
}

impl Spreadsheet for CsvSpreadsheet {
    fn name(&self) -> String {
        self.name.to_owned()
    }

    fn sheet_names(&self) -> Vec<String> {
        vec![self.sheet_name.to_owned()]
    }

    fn read_sheets(&mut self, criteria: &Criteria) -> Result<Vec<Sheet>, QuoteError> {
        if criteria.sheet_limit_reached(0) || !criteria.accept(&self.sheet_name) {
            return Ok(Vec::new());
        }

        self.reader.seek(SeekFrom::Start(0))?;
        let mut sheet = Sheet::new(&self.name, &self.sheet_name, criteria.range, criteria.rows_limit, criteria.skip_empty_rows);
        let mut records = ::csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(&mut self.reader);
        'rows: for (row, record) in records.records().enumerate() {
            let record = record?;
            if sheet.after_row_upper_bound(row) {
                break;
            }
            for (col, field) in record.iter().enumerate() {
                let field = if row == 0 && col == 0 { field.trim_start_matches('\u{feff}') } else { field };
                if field.trim().is_empty() || !sheet.contains(row, col) {
                    continue;
                }
                if criteria.end_at_empty_row && sheet.is_after_gap(row) {
                    break 'rows;
                }
                sheet.push(Cell {
                    row,
                    col,
                    kind: CellType::Text,
                    value: field.to_owned(),
                });
            }
        }
        log::debug!("Read {} cells from '{}'", sheet.cells.len(), self.name);
        Ok(vec![sheet])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::range::Range;

    fn spreadsheet(content: &str) -> CsvSpreadsheet {
        CsvSpreadsheet::from_bytes("vehicles.csv", "vehicles", content.as_bytes().to_vec())
    }

    #[test]
    fn reads_all_cells() {
        let mut csv = spreadsheet("\u{feff}品牌,車型\nToyota,Altis\n,\nHonda,Fit\n");
        let sheets = csv.read_sheets(&Criteria::default()).unwrap();
        assert_eq!(sheets.len(), 1);

        let sheet = &sheets[0];
        assert_eq!(sheet.name, "vehicles");
        assert_eq!(sheet.cells.len(), 6);
        assert_eq!(sheet.cells[0].value, "品牌");
        assert_eq!(sheet.cells[5].reference(), "B4");
    }

    #[test]
    fn reading_twice_rewinds() {
        let mut csv = spreadsheet("a,b\n1,2\n");
        let first = csv.read_sheets(&Criteria::default()).unwrap();
        let second = csv.read_sheets(&Criteria::default()).unwrap();
        assert_eq!(first[0].cells, second[0].cells);
    }

    #[test]
    fn stops_at_empty_row() {
        let mut csv = spreadsheet("a,b\n1,2\n,\n3,4\n");
        let criteria = Criteria {
            end_at_empty_row: true,
            ..Criteria::default()
        };
        let sheets = csv.read_sheets(&criteria).unwrap();
        assert_eq!(sheets[0].cells.len(), 4);
    }

    #[test]
    fn honours_range_and_patterns() {
        let mut csv = spreadsheet("a,b,c\n1,2,3\n4,5,6\n");
        let criteria = Criteria {
            range: Some(Range::try_from("B1:C2").unwrap()),
            ..Criteria::default()
        };
        let sheets = csv.read_sheets(&criteria).unwrap();
        let values = sheets[0].cells.iter().map(|cell| cell.value.as_str()).collect::<Vec<_>>();
        assert_eq!(values, vec!["b", "c", "2", "3"]);

        let criteria = Criteria::for_sheet(glob::Pattern::new("prices").unwrap());
        assert!(csv.read_sheets(&criteria).unwrap().is_empty());
    }
}
