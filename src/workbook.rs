//! Loads both views of the quote workbook: the vehicle catalog and the option price table.
//!
//! Without sheet settings, vehicles come from `工作表1` (or the first sheet) and option
//! prices from the sheet following the vehicle sheet in the same workbook, or the first
//! sheet of a separate one.
use crate::catalog::VehicleCatalog;
use crate::config::Settings;
use crate::config::SourceSettings;
use crate::error::QuoteError;
use crate::error::ResultMessage;
use crate::error::ResultOptionChain;
use crate::pricing::PriceTable;
use crate::spreadsheet::open_spreadsheet;
use crate::spreadsheet::read_first_sheet;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::Spreadsheet;
use crate::spreadsheet::SpreadsheetError;
use glob::Pattern;

/// Sheet holding the vehicle catalog in the reference workbook.
pub const DEFAULT_VEHICLE_SHEET: &str = "工作表1";

/// Everything a quote needs from the workbook.
#[derive(Clone, Debug)]
pub struct Workbook {
    pub catalog: VehicleCatalog,
    pub prices: PriceTable,
}

impl Workbook {
    /// Opens the configured workbook(s) and reads both views.
    pub fn load(settings: &Settings) -> Result<Workbook, QuoteError> {
        let vehicle_file = settings.vehicle_file()?;
        let vehicle_name = vehicle_file.to_string_lossy().to_string();
        let mut vehicles = open_spreadsheet(&vehicle_name).with_prefix("Open vehicle workbook")?;

        let option_file = settings.option_file()?;
        if option_file == vehicle_file {
            return Self::from_spreadsheet(vehicles.as_mut(), settings);
        }
        let option_name = option_file.to_string_lossy().to_string();
        let mut options = open_spreadsheet(&option_name).with_prefix("Open option workbook")?;
        Self::from_spreadsheets(vehicles.as_mut(), options.as_mut(), settings)
    }

    /// Reads both views from a single workbook.
    pub fn from_spreadsheet(spreadsheet: &mut dyn Spreadsheet, settings: &Settings) -> Result<Workbook, QuoteError> {
        let (catalog, vehicle_sheet) = read_catalog(spreadsheet, settings)?;
        let option_sheet = option_sheet(&spreadsheet.sheet_names(), &vehicle_sheet);
        let prices = match (&settings.options.sheet, option_sheet) {
            (None, None) => {
                log::warn!("'{}' has no option sheet, no options will be offered", spreadsheet.name());
                PriceTable::default()
            }
            (_, option_sheet) => read_prices(spreadsheet, settings, option_sheet.as_deref())?,
        };
        Ok(Workbook { catalog, prices })
    }

    /// Reads vehicles and option prices from separate workbooks.
    pub fn from_spreadsheets(
        vehicles: &mut dyn Spreadsheet,
        options: &mut dyn Spreadsheet,
        settings: &Settings,
    ) -> Result<Workbook, QuoteError> {
        Ok(Workbook {
            catalog: read_catalog(vehicles, settings)?.0,
            prices: read_prices(options, settings, None)?,
        })
    }
}

/// Reads the vehicle catalog and returns it with the name of the sheet it came from.
fn read_catalog(spreadsheet: &mut dyn Spreadsheet, settings: &Settings) -> Result<(VehicleCatalog, String), QuoteError> {
    let source = &settings.vehicles;
    let sheet = match &source.sheet {
        Some(_) => read_sheet(spreadsheet, source, settings, None)?,
        None => read_optional_sheet(spreadsheet, source, settings, Some(DEFAULT_VEHICLE_SHEET))
            .ok_none_else(|| read_optional_sheet(spreadsheet, source, settings, None))?
            .ok_or_else(|| SpreadsheetError::SpreadsheetEmptyError(spreadsheet.name()))?,
    };
    let criteria = source.criteria(&settings.nulls)?;
    let table = sheet.table(&criteria.nulls)?;
    Ok((VehicleCatalog::from_table(&table, &settings.vehicle_columns)?, sheet.name))
}

/// Default option sheet: the first sheet after the vehicle sheet, else the first other sheet.
fn option_sheet(sheet_names: &[String], vehicle_sheet: &str) -> Option<String> {
    let position = sheet_names.iter().position(|name| name == vehicle_sheet).unwrap_or(0);
    sheet_names[position..]
        .iter()
        .chain(&sheet_names[..position])
        .find(|name| *name != vehicle_sheet)
        .cloned()
}

fn read_prices(spreadsheet: &mut dyn Spreadsheet, settings: &Settings, default_sheet: Option<&str>) -> Result<PriceTable, QuoteError> {
    let source = &settings.options;
    let sheet = read_sheet(spreadsheet, source, settings, default_sheet)?;
    let criteria = source.criteria(&settings.nulls)?;
    let table = sheet.table(&criteria.nulls)?;
    PriceTable::from_table(&table, &settings.option_columns)
}

/// Reads the configured sheet, or `default_sheet` when none is configured.
fn read_sheet(
    spreadsheet: &mut dyn Spreadsheet,
    source: &SourceSettings,
    settings: &Settings,
    default_sheet: Option<&str>,
) -> Result<Sheet, QuoteError> {
    let pattern = source.sheet.as_deref().or(default_sheet).unwrap_or("*").to_owned();
    read_optional_sheet(spreadsheet, source, settings, default_sheet)?
        .ok_or_else(|| SpreadsheetError::SheetNotFound(spreadsheet.name(), pattern).into())
}

fn read_optional_sheet(
    spreadsheet: &mut dyn Spreadsheet,
    source: &SourceSettings,
    settings: &Settings,
    default_sheet: Option<&str>,
) -> Result<Option<Sheet>, QuoteError> {
    let mut criteria = source.criteria(&settings.nulls)?;
    if let (None, Some(default_sheet)) = (&source.sheet, default_sheet) {
        criteria.sheet_name_patterns = Some(vec![Pattern::new(&Pattern::escape(default_sheet))?]);
    }
    read_first_sheet(spreadsheet, &criteria)
}

