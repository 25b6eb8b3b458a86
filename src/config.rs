//! Settings describing where the vehicle and option data live and how to read them.
//!
//! Settings are read from a JSON file; every key is optional and falls back to the layout of
//! the shop's reference workbook.
use crate::error::QuoteError;
use crate::pricing::DuplicatePolicy;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::range::Range;
use glob::Pattern;
use serde::Deserialize;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Read settings '{0}' failed: {1}")]
    ReadError(String, std::io::Error),

    #[error("Parse settings '{0}' failed: {1}")]
    ParseError(String, serde_json::Error),

    #[error("No data file configured, pass --data or set `vehicles.file`")]
    MissingDataFile,
}

/// Where one view of the workbook is read from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceSettings {
    /// Workbook path; the option source falls back to the vehicle workbook
    pub file: Option<PathBuf>,
    /// Glob pattern selecting the sheet
    pub sheet: Option<String>,
    /// A1-style data range such as `A1:H500`
    pub range: Option<String>,
}

impl SourceSettings {
    /// Builds reading criteria for this source.
    pub fn criteria(&self, nulls: &[String]) -> Result<Criteria, QuoteError> {
        let mut criteria = match &self.sheet {
            Some(sheet) => Criteria::for_sheet(Pattern::new(sheet)?),
            None => Criteria::default(),
        };
        criteria.range = self.range.as_deref().map(Range::try_from).transpose()?;
        if !nulls.is_empty() {
            criteria.nulls = nulls.iter().map(|null| null.to_owned()).collect();
        }
        Ok(criteria)
    }
}

/// Column headers of the vehicle sheet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VehicleColumns {
    pub brand: String,
    pub model: String,
    pub length: String,
    pub width: String,
    pub height: String,
    pub classification: String,
    pub price_band: String,
    /// Base coating price; not every workbook carries one
    pub base_price: Option<String>,
}

impl Default for VehicleColumns {
    fn default() -> Self {
        VehicleColumns {
            brand: "品牌".to_owned(),
            model: "車型".to_owned(),
            length: "車長(mm)".to_owned(),
            width: "車寬(mm)".to_owned(),
            height: "車高(mm)".to_owned(),
            classification: "巧思分類".to_owned(),
            price_band: "總價落點".to_owned(),
            base_price: None,
        }
    }
}

/// Column headers of the option price sheet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptionColumns {
    /// Classification key column; every other column is an option
    pub classification: String,
}

impl Default for OptionColumns {
    fn default() -> Self {
        OptionColumns {
            classification: "巧思分類".to_owned(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub vehicles: SourceSettings,
    pub options: SourceSettings,
    pub vehicle_columns: VehicleColumns,
    pub option_columns: OptionColumns,
    /// How a second selection of the same option is treated
    pub duplicate_policy: DuplicatePolicy,
    /// Label printed in front of amounts
    pub currency: String,
    /// Null literals; empty keeps the reader defaults
    pub nulls: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            vehicles: SourceSettings::default(),
            options: SourceSettings::default(),
            vehicle_columns: VehicleColumns::default(),
            option_columns: OptionColumns::default(),
            duplicate_policy: DuplicatePolicy::default(),
            currency: "NT$".to_owned(),
            nulls: Vec::new(),
        }
    }
}

impl Settings {
    /// Loads settings from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Settings, ConfigError> {
        let name = path.as_ref().display().to_string();
        let content = fs::read_to_string(path.as_ref()).map_err(|error| ConfigError::ReadError(name.to_owned(), error))?;
        let settings = Self::from_json(&content).map_err(|error| ConfigError::ParseError(name.to_owned(), error))?;
        log::info!("Loaded settings from '{}'", name);
        Ok(settings)
    }

    pub fn from_json(content: &str) -> Result<Settings, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// The vehicle workbook path.
    pub fn vehicle_file(&self) -> Result<&Path, ConfigError> {
        self.vehicles.file.as_deref().ok_or(ConfigError::MissingDataFile)
    }

    /// The option workbook path, which defaults to the vehicle workbook.
    pub fn option_file(&self) -> Result<&Path, ConfigError> {
        match self.options.file.as_deref() {
            Some(file) => Ok(file),
            None => self.vehicle_file(),
        }
    }
}
