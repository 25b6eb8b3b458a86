//! # Vehicle Catalog
//!
//! The vehicle specification view of the workbook: one row per brand and model with its
//! dimensions, pricing classification and price band. Supports the cascading brand/model
//! choice and the four-way filter of the lookup form.
use crate::catalog::vehicle::VehicleLayout;
use crate::config::VehicleColumns;
use crate::spreadsheet::table::Table;
use crate::spreadsheet::SpreadsheetError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt::Display;
use thiserror::Error;

pub mod vehicle;

pub use vehicle::Vehicle;

/// Key used in summaries for vehicles without a classification.
pub const UNCLASSIFIED: &str = "(none)";

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("{0}")]
    SpreadsheetError(#[from] SpreadsheetError),

    #[error("Invalid cell value in '{0}' sheet '{1}' at {2}: {3}")]
    InvalidCellValue(String, String, String, String),

    #[error("No vehicle '{0} {1}' in catalog")]
    VehicleNotFound(String, String),

    #[error("'{0} {1}' matches {2} rows with different classifications or prices")]
    AmbiguousVehicle(String, String, usize),
}

/// One side of the brand/model filter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Choice {
    /// No restriction
    #[default]
    All,
    /// Exact match on the trimmed value
    Only(String),
}

impl Choice {
    /// Label the lookup form used for "no restriction".
    pub const ALL_LABEL: &'static str = "全部";

    /// Interprets an optional user value; a missing value or the "all" label means no restriction.
    pub fn parse(value: Option<&str>) -> Choice {
        match value.map(str::trim) {
            None => Choice::All,
            Some(value) if value.is_empty() || value == Self::ALL_LABEL || value.eq_ignore_ascii_case("all") => Choice::All,
            Some(value) => Choice::Only(value.to_owned()),
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(expected) => expected == value,
        }
    }
}

impl Display for Choice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Choice::All => write!(f, "{}", Self::ALL_LABEL),
            Choice::Only(value) => write!(f, "{}", value),
        }
    }
}

/// Count of matching vehicles, overall and per classification.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub by_classification: BTreeMap<String, usize>,
}

/// All vehicles of the specification sheet, in sheet order.
#[derive(Clone, Debug, Default)]
pub struct VehicleCatalog {
    vehicles: Vec<Vehicle>,
}

impl VehicleCatalog {
    pub fn new(vehicles: Vec<Vehicle>) -> VehicleCatalog {
        VehicleCatalog { vehicles }
    }

    /// Reads vehicles from a table, dropping rows without brand or model.
    pub fn from_table(table: &Table, columns: &VehicleColumns) -> Result<VehicleCatalog, CatalogError> {
        let layout = VehicleLayout::resolve(table, columns)?;
        let mut vehicles = Vec::<Vehicle>::with_capacity(table.rows.len());
        for row in &table.rows {
            match layout.read(table, row)? {
                Some(vehicle) => vehicles.push(vehicle),
                None if row.is_blank() => (),
                None => log::debug!("Skip row {} of sheet '{}': missing brand or model", row.number, table.sheet_name),
            }
        }
        log::info!("Loaded {} vehicles from sheet '{}' of '{}'", vehicles.len(), table.sheet_name, table.file_name);
        Ok(VehicleCatalog { vehicles })
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// Sorted unique brands.
    pub fn brands(&self) -> Vec<String> {
        self.vehicles
            .iter()
            .map(|vehicle| vehicle.brand.to_owned())
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect()
    }

    /// Sorted unique models of the chosen brand.
    pub fn models(&self, brand: &Choice) -> Vec<String> {
        self.vehicles
            .iter()
            .filter(|vehicle| brand.matches(&vehicle.brand))
            .map(|vehicle| vehicle.model.to_owned())
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect()
    }

    /// Vehicles matching both choices, in sheet order.
    pub fn filter(&self, brand: &Choice, model: &Choice) -> Vec<&Vehicle> {
        self.vehicles
            .iter()
            .filter(|vehicle| brand.matches(&vehicle.brand) && model.matches(&vehicle.model))
            .collect()
    }

    /// The vehicle for a brand and model.
    ///
    /// Repeated rows that agree on classification and base price are the same vehicle and
    /// the first one is returned; rows that disagree make the lookup ambiguous.
    pub fn find(&self, brand: &str, model: &str) -> Result<&Vehicle, CatalogError> {
        let (brand, model) = (brand.trim(), model.trim());
        let matches = self.filter(&Choice::Only(brand.to_owned()), &Choice::Only(model.to_owned()));
        let first = *matches.first()
            .ok_or_else(|| CatalogError::VehicleNotFound(brand.to_owned(), model.to_owned()))?;
        let consistent = matches.iter().all(|vehicle| {
            vehicle.classification == first.classification && vehicle.base_price == first.base_price
        });
        if !consistent {
            Err(CatalogError::AmbiguousVehicle(brand.to_owned(), model.to_owned(), matches.len()))?
        }
        if matches.len() > 1 {
            log::debug!("'{} {}' appears on {} rows, using row {}", brand, model, matches.len(), first.row);
        }
        Ok(first)
    }
}

/// Counts vehicles per classification.
pub fn summarize(vehicles: &[&Vehicle]) -> Summary {
    let mut by_classification = BTreeMap::<String, usize>::new();
    for vehicle in vehicles {
        let key = vehicle.classification.as_deref().unwrap_or(UNCLASSIFIED);
        *by_classification.entry(key.to_owned()).or_default() += 1;
    }
    Summary {
        count: vehicles.len(),
        by_classification,
    }
}
