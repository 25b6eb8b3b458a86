use crate::spreadsheet::range::Range;
use glob::Pattern;
use std::collections::HashSet;

/// Literals treated as missing values when none are configured.
pub const DEFAULT_NULLS: [&str; 4] = ["", "NaN", "nan", "#N/A"];

/// Criteria for filtering and selecting data from spreadsheets.
#[derive(Clone, Debug)]
pub struct Criteria {
    /// Sheet name patterns for filtering which sheets to process.
    pub sheet_name_patterns: Option<Vec<Pattern>>,

    /// Maximum number of sheets to read.
    pub sheet_limit: Option<usize>,

    /// Data range within sheets to extract.
    pub range: Option<Range>,

    /// Maximum number of rows to read per sheet, header included.
    pub rows_limit: Option<usize>,

    /// Null literals
    pub nulls: HashSet<String>,

    /// Convert error cells to null values instead of failing.
    pub error_as_null: bool,

    /// Skip rows where all columns are empty.
    pub skip_empty_rows: bool,

    /// Stop reading when encountering a completely empty row.
    pub end_at_empty_row: bool,
}

impl Default for Criteria {
    fn default() -> Self {
        Criteria {
            sheet_name_patterns: None,
            sheet_limit: None,
            range: None,
            rows_limit: None,
            nulls: DEFAULT_NULLS.iter().map(|null| null.to_string()).collect(),
            error_as_null: true,
            skip_empty_rows: true,
            end_at_empty_row: false,
        }
    }
}

impl Criteria {
    /// Criteria selecting the single sheet matching `pattern`.
    pub fn for_sheet(pattern: Pattern) -> Self {
        Criteria {
            sheet_name_patterns: Some(vec![pattern]),
            sheet_limit: Some(1),
            ..Criteria::default()
        }
    }

    /// Checks if a sheet name matches the criteria patterns.
    /// Returns true if no patterns are specified or if name matches any pattern.
    pub fn accept(&self, sheet_name: &str) -> bool {
        if let Some(patterns) = &self.sheet_name_patterns {
            for pattern in patterns {
                if pattern.matches(sheet_name) {
                    return true;
                }
            }
            false
        } else {
            true
        }
    }

    /// Returns true once `sheet_count` sheets have been read.
    pub(crate) fn sheet_limit_reached(&self, sheet_count: usize) -> bool {
        self.sheet_limit.map(|limit| sheet_count >= limit).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accept_without_patterns() {
        let criteria = Criteria::default();
        assert!(criteria.accept("工作表1"));
        assert!(!criteria.sheet_limit_reached(100));
    }

    #[test]
    fn accept_with_patterns() {
        let criteria = Criteria::for_sheet(Pattern::new("價格*").unwrap());
        assert!(criteria.accept("價格表"));
        assert!(!criteria.accept("工作表1"));
        assert!(criteria.sheet_limit_reached(1));
    }
}
