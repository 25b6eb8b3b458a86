use crate::config::OptionColumns;
use crate::error::QuoteError;
use crate::pricing::PricingError;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::table::Table;
use serde::Serialize;
use std::collections::HashMap;

/// Maximum number of option columns in the price sheet.
pub const MAX_OPTIONS: usize = 18;

/// Options offered under one classification, in column order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct OptionSet {
    prices: Vec<(String, u64)>,
}

impl OptionSet {
    /// Unit price of an offered option.
    pub fn price(&self, option: &str) -> Option<u64> {
        let option = option.trim();
        self.prices
            .iter()
            .find(|(name, _)| name == option)
            .map(|(_, price)| *price)
    }

    pub fn contains(&self, option: &str) -> bool {
        self.price(option).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.prices.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.prices.iter().map(|(name, price)| (name.as_str(), *price))
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

/// What a classification offers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Availability<'a> {
    Options(&'a OptionSet),
    /// No pricing row, or a row that prices nothing
    NoOptions,
}

/// Option prices per classification.
#[derive(Clone, Debug, Default)]
pub struct PriceTable {
    /// Option names in column order
    options: Vec<String>,
    classifications: HashMap<String, OptionSet>,
}

impl PriceTable {
    /// Reads the wide option sheet: a classification column plus one column per option.
    ///
    /// A null price cell means the option is not offered. Repeated classification rows are
    /// merged; the earlier row wins and later rows only fill the options it left unpriced.
    pub fn from_table(table: &Table, columns: &OptionColumns) -> Result<PriceTable, QuoteError> {
        let classification_col = table.require_column(&columns.classification)?;
        let option_cols = (0..table.columns.len())
            .filter(|col| *col != classification_col)
            .collect::<Vec<usize>>();
        if option_cols.len() > MAX_OPTIONS {
            Err(PricingError::TooManyOptions(table.file_name.to_owned(), table.sheet_name.to_owned(), option_cols.len()))?
        }

        let mut rows = HashMap::<String, Vec<Option<u64>>>::new();
        for row in &table.rows {
            let classification = match row.get(classification_col).map(Cell::to_text).filter(|text| !text.is_empty()) {
                Some(classification) => classification,
                None => {
                    if !row.is_blank() {
                        log::debug!("Skip row {} of sheet '{}': missing classification", row.number, table.sheet_name);
                    }
                    continue;
                }
            };

            let prices = option_cols
                .iter()
                .map(|col| row.get(*col).map(|cell| price(table, cell)).transpose())
                .collect::<Result<Vec<Option<u64>>, PricingError>>()?;

            match rows.get_mut(&classification) {
                None => {
                    rows.insert(classification, prices);
                }
                Some(merged) => {
                    for (index, (current, later)) in merged.iter_mut().zip(prices).enumerate() {
                        match (*current, later) {
                            (None, Some(_)) => *current = later,
                            (Some(kept), Some(other)) if kept != other => log::warn!(
                                "Classification '{}' repeated at row {} of sheet '{}': keep {} = {}, ignore {}",
                                classification,
                                row.number,
                                table.sheet_name,
                                table.columns[option_cols[index]],
                                kept,
                                other
                            ),
                            _ => (),
                        }
                    }
                }
            }
        }

        let options = option_cols
            .iter()
            .map(|col| table.columns[*col].to_owned())
            .collect::<Vec<String>>();
        log::info!(
            "Loaded {} options for {} classifications from sheet '{}' of '{}'",
            options.len(),
            rows.len(),
            table.sheet_name,
            table.file_name
        );
        let classifications = rows
            .into_iter()
            .map(|(classification, prices)| (classification, offered_set(&options, &prices)))
            .collect::<HashMap<String, OptionSet>>();
        Ok(PriceTable { options, classifications })
    }

    /// Builds a price table from literal rows, each listing every option with its optional price.
    #[cfg(test)]
    pub(crate) fn from_prices(rows: &[(&str, &[(&str, Option<u64>)])]) -> PriceTable {
        let mut table = PriceTable::default();
        for (classification, prices) in rows {
            for (option, _) in prices.iter() {
                if !table.options.iter().any(|name| name == option) {
                    table.options.push(option.to_string());
                }
            }
            let set = OptionSet {
                prices: prices
                    .iter()
                    .filter_map(|(option, price)| price.map(|price| (option.to_string(), price)))
                    .collect(),
            };
            table.classifications.entry(classification.to_string()).or_insert(set);
        }
        table
    }

    /// Every option column name, offered or not.
    pub fn option_names(&self) -> &[String] {
        &self.options
    }

    /// Classifications that have a pricing row, sorted.
    pub fn classifications(&self) -> Vec<&str> {
        let mut classifications = self.classifications.keys().map(String::as_str).collect::<Vec<&str>>();
        classifications.sort_unstable();
        classifications
    }

    /// Options offered for a classification.
    pub fn offered(&self, classification: &str) -> Availability<'_> {
        match self.classifications.get(classification.trim()) {
            Some(options) if !options.is_empty() => Availability::Options(options),
            _ => Availability::NoOptions,
        }
    }
}

fn offered_set(options: &[String], prices: &[Option<u64>]) -> OptionSet {
    OptionSet {
        prices: options
            .iter()
            .zip(prices)
            .filter_map(|(option, price)| price.map(|price| (option.to_owned(), price)))
            .collect(),
    }
}

fn price(table: &Table, cell: &Cell) -> Result<u64, PricingError> {
    let invalid = |message: String| PricingError::InvalidPrice(
        table.file_name.to_owned(),
        table.sheet_name.to_owned(),
        cell.reference(),
        message,
    );
    let value = cell.to_integer().map_err(invalid)?;
    u64::try_from(value).map_err(|_| invalid(format!("price {} must not be negative", value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::cell::CellType;
    use crate::spreadsheet::table::Row;
    use pretty_assertions::assert_eq;

    fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
        Table {
            file_name: "qiaosi.xlsx".to_owned(),
            sheet_name: "選項價格".to_owned(),
            columns: columns.iter().map(|name| name.to_string()).collect(),
            rows: rows.iter().enumerate().map(|(index, values)| Row {
                number: index + 2,
                cells: values.iter().enumerate().map(|(col, value)| {
                    Some(Cell {
                        row: index + 1,
                        col,
                        kind: CellType::Number,
                        value: value.to_string(),
                    }).filter(|_| !value.is_empty())
                }).collect(),
            }).collect(),
        }
    }

    fn prices(availability: Availability<'_>) -> Vec<(String, u64)> {
        match availability {
            Availability::Options(options) => options.iter().map(|(name, price)| (name.to_owned(), price)).collect(),
            Availability::NoOptions => Vec::new(),
        }
    }

    #[test]
    fn blank_price_is_not_offered() {
        let table = PriceTable::from_table(&table(
            &["巧思分類", "Wax", "Seal", "Glass"],
            &[&["A", "1000", "2000", ""], &["B", "1,200", "", "800"]],
        ), &OptionColumns::default()).unwrap();

        assert_eq!(table.option_names(), &["Wax".to_owned(), "Seal".to_owned(), "Glass".to_owned()]);
        assert_eq!(table.classifications(), vec!["A", "B"]);
        assert_eq!(prices(table.offered("A")), vec![("Wax".to_owned(), 1000), ("Seal".to_owned(), 2000)]);
        assert_eq!(prices(table.offered(" B ")), vec![("Wax".to_owned(), 1200), ("Glass".to_owned(), 800)]);
        assert_eq!(table.offered("C"), Availability::NoOptions);
    }

    #[test]
    fn classification_column_may_be_anywhere() {
        let table = PriceTable::from_table(&table(
            &["Wax", "巧思分類"],
            &[&["500", "A"], &["", "E"]],
        ), &OptionColumns::default()).unwrap();
        assert_eq!(prices(table.offered("A")), vec![("Wax".to_owned(), 500)]);
        assert_eq!(table.offered("E"), Availability::NoOptions);
    }

    #[test]
    fn repeated_classification_rows_merge() {
        let table = PriceTable::from_table(&table(
            &["巧思分類", "Wax", "Seal"],
            &[&["A", "1000", ""], &["A", "900", "2000"]],
        ), &OptionColumns::default()).unwrap();
        assert_eq!(prices(table.offered("A")), vec![("Wax".to_owned(), 1000), ("Seal".to_owned(), 2000)]);
    }

    #[test]
    fn invalid_prices_are_reported() {
        for value in ["-100", "99.5", "call us"] {
            let error = PriceTable::from_table(&table(
                &["巧思分類", "Wax"],
                &[&["A", value]],
            ), &OptionColumns::default()).unwrap_err();
            assert!(matches!(error, QuoteError::PricingError(PricingError::InvalidPrice(_, _, ref reference, _)) if reference == "B2"));
        }
    }

    #[test]
    fn formula_residue_is_rounded() {
        let table = PriceTable::from_table(&table(
            &["巧思分類", "Wax", "Seal"],
            &[&["A", "1199.9999999999998", "2000.0000000000002"]],
        ), &OptionColumns::default()).unwrap();
        assert_eq!(prices(table.offered("A")), vec![("Wax".to_owned(), 1200), ("Seal".to_owned(), 2000)]);
    }

    #[test]
    fn at_most_eighteen_options() {
        let mut columns = vec!["巧思分類".to_owned()];
        columns.extend((1..=19).map(|index| format!("Option {}", index)));
        let columns = columns.iter().map(String::as_str).collect::<Vec<&str>>();

        let error = PriceTable::from_table(&table(&columns, &[]), &OptionColumns::default()).unwrap_err();
        assert!(matches!(error, QuoteError::PricingError(PricingError::TooManyOptions(_, _, 19))));
        assert!(PriceTable::from_table(&table(&columns[..19], &[]), &OptionColumns::default()).is_ok());
    }

    #[test]
    fn missing_classification_column() {
        let error = PriceTable::from_table(&table(&["Wax"], &[]), &OptionColumns::default()).unwrap_err();
        assert!(matches!(error, QuoteError::SpreadsheetError(_)));
    }

    #[test]
    fn literal_prices() {
        let table = PriceTable::from_prices(&[("A", &[("Wax", Some(1000)), ("Seal", None)])]);
        assert_eq!(table.option_names().len(), 2);
        match table.offered("A") {
            Availability::Options(options) => {
                assert!(options.contains("Wax"));
                assert!(!options.contains("Seal"));
                assert_eq!(options.names().collect::<Vec<_>>(), vec!["Wax"]);
            }
            Availability::NoOptions => panic!("classification A offers Wax"),
        }
    }
}
