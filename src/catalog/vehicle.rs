use crate::catalog::CatalogError;
use crate::config::VehicleColumns;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::table::Row;
use crate::spreadsheet::table::Table;
use serde::Serialize;

/// One row of the vehicle specification sheet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Vehicle {
    /// 1-based sheet row the vehicle was read from
    pub row: usize,
    pub brand: String,
    pub model: String,
    pub length_mm: Option<i64>,
    pub width_mm: Option<i64>,
    pub height_mm: Option<i64>,
    /// Pricing tier used as the key into the option price table
    pub classification: Option<String>,
    /// Display-only coating plan price range
    pub price_band: Option<String>,
    /// Base coating price in whole currency units
    pub base_price: Option<u64>,
}

/// Column positions resolved against a table header.
pub(crate) struct VehicleLayout {
    brand: usize,
    model: usize,
    length: usize,
    width: usize,
    height: usize,
    classification: usize,
    price_band: usize,
    base_price: Option<usize>,
}

impl VehicleLayout {
    pub(crate) fn resolve(table: &Table, columns: &VehicleColumns) -> Result<VehicleLayout, CatalogError> {
        Ok(VehicleLayout {
            brand: table.require_column(&columns.brand)?,
            model: table.require_column(&columns.model)?,
            length: table.require_column(&columns.length)?,
            width: table.require_column(&columns.width)?,
            height: table.require_column(&columns.height)?,
            classification: table.require_column(&columns.classification)?,
            price_band: table.require_column(&columns.price_band)?,
            base_price: columns.base_price
                .as_deref()
                .map(|name| table.require_column(name))
                .transpose()?,
        })
    }

    /// Reads a vehicle; rows without brand or model yield `None`.
    pub(crate) fn read(&self, table: &Table, row: &Row) -> Result<Option<Vehicle>, CatalogError> {
        let brand = text(row, self.brand);
        let model = text(row, self.model);
        let (brand, model) = match brand.zip(model) {
            Some(pair) => pair,
            None => return Ok(None),
        };

        let base_price = match self.base_price.and_then(|index| row.get(index)) {
            Some(cell) => Some(integer(table, cell)
                .and_then(|price| u64::try_from(price).map_err(|_| invalid(table, cell, "price must not be negative".to_owned())))?),
            None => None,
        };
        Ok(Some(Vehicle {
            row: row.number,
            brand,
            model,
            length_mm: row.get(self.length).map(|cell| integer(table, cell)).transpose()?,
            width_mm: row.get(self.width).map(|cell| integer(table, cell)).transpose()?,
            height_mm: row.get(self.height).map(|cell| integer(table, cell)).transpose()?,
            classification: text(row, self.classification),
            price_band: text(row, self.price_band),
            base_price,
        }))
    }
}

fn text(row: &Row, index: usize) -> Option<String> {
    row.get(index)
        .map(Cell::to_text)
        .filter(|text| !text.is_empty())
}

fn integer(table: &Table, cell: &Cell) -> Result<i64, CatalogError> {
    cell.to_integer().map_err(|message| invalid(table, cell, message))
}

fn invalid(table: &Table, cell: &Cell, message: String) -> CatalogError {
    CatalogError::InvalidCellValue(
        table.file_name.to_owned(),
        table.sheet_name.to_owned(),
        cell.reference(),
        message,
    )
}
