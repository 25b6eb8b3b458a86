use crate::spreadsheet::reference::index_to_reference;
use std::collections::HashSet;
use std::fmt::Display;

/// Types of cell data in spreadsheet files.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CellType {
    #[default]
    Empty,
    /// Boolean values (stored as `1`/`0`)
    Boolean,
    /// Numeric values
    Number,
    /// Text, whether inline, shared or read from CSV
    Text,
    /// Error values such as `#N/A`
    Error,
}

/// Largest distance from a whole number that [`Cell::to_integer`] still rounds away.
pub const WHOLE_NUMBER_TOLERANCE: f64 = 1e-9;

/// Converts an xlsx `t` attribute to the cell type it declares.
pub(crate) fn from_type_attribute(value: Option<&str>) -> CellType {
    match value {
        Some("inlineStr") | Some("str") | Some("s") => CellType::Text,
        Some("b") => CellType::Boolean,
        Some("e") => CellType::Error,
        _ => CellType::Number,
    }
}

/// Represents a single cell in a spreadsheet with position, type, and value.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    /// Row index (0-based)
    pub row: usize,
    /// Column index (0-based)
    pub col: usize,
    /// Cell data type
    pub kind: CellType,
    /// Cell value as string
    pub value: String,
}

impl Cell {
    /// Returns the Excel-style cell reference (e.g., "A1", "B2").
    pub fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    /// Checks whether the cell carries no usable value.
    ///
    /// Empty cells, cells matching one of the null literals (compared after trimming)
    /// and numbers that are not finite are all null.
    pub fn is_null(&self, nulls: &HashSet<String>) -> bool {
        match self.kind {
            CellType::Empty => true,
            CellType::Number => {
                nulls.contains(self.value.trim())
                    || self.value.trim().parse::<f64>().map(|value| !value.is_finite()).unwrap_or(false)
            }
            _ => nulls.contains(self.value.trim()),
        }
    }

    /// Returns the trimmed textual value of the cell.
    ///
    /// Whole numbers lose their trailing `.0` so a model named `3` stored as a number
    /// reads the same as one stored as text.
    pub fn to_text(&self) -> String {
        match self.kind {
            CellType::Boolean => if self.value == "1" { "true" } else { "false" }.to_owned(),
            CellType::Number => match self.value.trim().parse::<f64>() {
                Ok(value) if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 => {
                    format!("{}", value as i64)
                }
                _ => self.value.trim().to_owned(),
            },
            _ => self.value.trim().to_owned(),
        }
    }

    /// Converts the cell to a whole integer.
    ///
    /// Accepts `1000`, `1000.0` and `1,000`. A formula result such as `1199.9999999999998`
    /// rounds to the whole number it is within [`WHOLE_NUMBER_TOLERANCE`] of. Other fractions,
    /// text and non-finite numbers are errors.
    pub fn to_integer(&self) -> Result<i64, String> {
        let text = self.value.trim().replace(',', "");
        if let Ok(value) = text.parse::<i64>() {
            return Ok(value);
        }
        match text.parse::<f64>() {
            Ok(value) if value.is_finite()
                && (value - value.round()).abs() < WHOLE_NUMBER_TOLERANCE
                && value.abs() < 9.0e15 => Ok(value.round() as i64),
            Ok(_) => Err(format!("'{}' is not a whole number", self.value)),
            Err(_) => Err(format!("parse '{}' to integer failed", self.value)),
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(kind: CellType, value: &str) -> Cell {
        Cell {
            row: 2,
            col: 1,
            kind,
            value: value.to_owned(),
        }
    }

    fn nulls() -> HashSet<String> {
        ["", "NaN", "nan", "#N/A"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn reference_and_display() {
        let cell = cell(CellType::Number, "4690.0");
        assert_eq!(cell.reference(), "B3");
        assert_eq!(cell.to_string(), "4690");
    }

    #[test]
    fn text_conversion() {
        assert_eq!(cell(CellType::Text, "  Toyota ").to_text(), "Toyota");
        assert_eq!(cell(CellType::Number, "3").to_text(), "3");
        assert_eq!(cell(CellType::Number, "4.5").to_text(), "4.5");
        assert_eq!(cell(CellType::Boolean, "1").to_text(), "true");
    }

    #[test]
    fn integer_conversion() {
        assert_eq!(cell(CellType::Number, "1000").to_integer(), Ok(1000));
        assert_eq!(cell(CellType::Number, "1000.0").to_integer(), Ok(1000));
        assert_eq!(cell(CellType::Text, "1,500").to_integer(), Ok(1500));
        assert_eq!(cell(CellType::Text, "-20").to_integer(), Ok(-20));
        assert_eq!(cell(CellType::Number, "1199.9999999999998").to_integer(), Ok(1200));
        assert_eq!(cell(CellType::Number, "2500.0000000001").to_integer(), Ok(2500));
        assert!(cell(CellType::Number, "1199.999").to_integer().is_err());
        assert!(cell(CellType::Number, "999.5").to_integer().is_err());
        assert!(cell(CellType::Text, "Wax").to_integer().is_err());
        assert!(cell(CellType::Number, "NaN").to_integer().is_err());
    }

    #[test]
    fn null_detection() {
        let nulls = nulls();
        assert!(cell(CellType::Empty, "").is_null(&nulls));
        assert!(cell(CellType::Text, " NaN ").is_null(&nulls));
        assert!(cell(CellType::Number, "inf").is_null(&nulls));
        assert!(cell(CellType::Error, "#N/A").is_null(&nulls));
        assert!(!cell(CellType::Number, "0").is_null(&nulls));
        assert!(!cell(CellType::Text, "A").is_null(&nulls));
    }

    #[test]
    fn type_attribute() {
        assert_eq!(from_type_attribute(Some("s")), CellType::Text);
        assert_eq!(from_type_attribute(Some("b")), CellType::Boolean);
        assert_eq!(from_type_attribute(Some("e")), CellType::Error);
        assert_eq!(from_type_attribute(None), CellType::Number);
    }
}
