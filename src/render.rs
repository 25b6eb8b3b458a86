//! Plain text and JSON output for vehicle lists and quote sheets.
use crate::catalog::Summary;
use crate::catalog::Vehicle;
use crate::error::QuoteError;
use crate::pricing::Quote;
use chrono::NaiveDate;
use comfy_table::modifiers;
use comfy_table::presets;
use comfy_table::Cell;
use comfy_table::CellAlignment;
use comfy_table::Table;
use serde::Serialize;

/// Header labels of the vehicle table, in display order.
const VEHICLE_HEADER: [&str; 7] = ["品牌", "車型", "車長", "車寬", "車高", "巧思分類", "鍍膜方案價格帶"];

/// Header labels of the line item table.
const ITEM_HEADER: [&str; 5] = ["#", "加購選項", "單價", "數量", "小計"];

/// Placeholder for a missing value.
const MISSING: &str = "-";

/// A priced quote for one vehicle, ready to print.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuoteSheet {
    pub vehicle: Vehicle,
    pub quote: Quote,
    pub issued_on: NaiveDate,
}

/// Vehicles matching a filter with their classification counts.
#[derive(Clone, Debug, Serialize)]
pub struct VehicleList<'a> {
    pub vehicles: Vec<&'a Vehicle>,
    pub summary: Summary,
}

/// Formats a whole amount with thousands separators.
pub fn format_number(value: u64) -> String {
    let digits = value.to_string();
    let mut formatted = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(digit);
    }
    formatted
}

/// Formats an amount behind a currency label, e.g. `NT$ 4,000`.
pub fn format_amount(currency: &str, value: u64) -> String {
    format!("{} {}", currency, format_number(value))
}

fn format_dimension(value: Option<i64>) -> String {
    match value {
        Some(value) if value < 0 => format!("-{} mm", format_number(value.unsigned_abs())),
        Some(value) => format!("{} mm", format_number(value.unsigned_abs())),
        None => MISSING.to_owned(),
    }
}

impl QuoteSheet {
    pub fn new(vehicle: &Vehicle, quote: Quote, issued_on: NaiveDate) -> QuoteSheet {
        QuoteSheet {
            vehicle: vehicle.clone(),
            quote,
            issued_on,
        }
    }

    /// Renders the quote as plain text: vehicle details, the line item table and the totals.
    pub fn to_text(&self, currency: &str) -> String {
        let vehicle = &self.vehicle;
        let mut lines = vec![
            "鍍膜報價單".to_owned(),
            format!("日期: {}", self.issued_on.format("%Y-%m-%d")),
            format!("車輛: {} {}", vehicle.brand, vehicle.model),
            format!(
                "尺寸: {} x {} x {}",
                format_dimension(vehicle.length_mm),
                format_dimension(vehicle.width_mm),
                format_dimension(vehicle.height_mm)
            ),
            format!("巧思分類: {}", vehicle.classification.as_deref().unwrap_or(MISSING)),
        ];
        if let Some(price_band) = &vehicle.price_band {
            lines.push(format!("鍍膜方案價格帶: {}", price_band));
        }
        if let Some(base_price) = self.quote.base_price {
            lines.push(format!("基本價: {}", format_amount(currency, base_price)));
        }

        lines.push(String::new());
        if !self.quote.options_available {
            lines.push("加購選項: 無可選配項目 (no options available)".to_owned());
        } else if self.quote.items.is_empty() {
            lines.push("加購選項: 未選擇".to_owned());
        } else {
            lines.push("加購選項:".to_owned());
            lines.push(self.item_table(currency).to_string());
            lines.push(format!("選項小計: {}", format_amount(currency, self.quote.options_total)));
        }
        lines.push(format!("總計: {}", format_amount(currency, self.quote.grand_total)));
        lines.join("\n") + "\n"
    }

    fn item_table(&self, currency: &str) -> Table {
        let mut table = text_table(&ITEM_HEADER);
        for (index, item) in self.quote.items.iter().enumerate() {
            table.add_row(vec![
                Cell::new(index + 1),
                Cell::new(&item.option),
                Cell::new(format_amount(currency, item.unit_price)),
                Cell::new(item.quantity),
                Cell::new(format_amount(currency, item.subtotal)),
            ]);
        }
        align_right(&mut table, &[0, 2, 3, 4]);
        table
    }

    pub fn to_json(&self) -> Result<String, QuoteError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl<'a> VehicleList<'a> {
    pub fn new(vehicles: Vec<&'a Vehicle>) -> VehicleList<'a> {
        let summary = crate::catalog::summarize(&vehicles);
        VehicleList { vehicles, summary }
    }

    /// Renders the vehicle table, the matching count and the per-classification counts.
    pub fn to_text(&self) -> String {
        let mut table = text_table(&VEHICLE_HEADER);
        for vehicle in &self.vehicles {
            table.add_row(vec![
                Cell::new(&vehicle.brand),
                Cell::new(&vehicle.model),
                Cell::new(format_dimension(vehicle.length_mm)),
                Cell::new(format_dimension(vehicle.width_mm)),
                Cell::new(format_dimension(vehicle.height_mm)),
                Cell::new(vehicle.classification.as_deref().unwrap_or(MISSING)),
                Cell::new(vehicle.price_band.as_deref().unwrap_or(MISSING)),
            ]);
        }
        align_right(&mut table, &[2, 3, 4]);

        let mut lines = vec![
            table.to_string(),
            String::new(),
            format!("符合條件車輛數：{} 台", self.summary.count),
        ];
        lines.extend(self.summary.by_classification.iter().map(|(classification, count)| {
            format!("  {}: {} 台", classification, count)
        }));
        lines.join("\n") + "\n"
    }

    pub fn to_json(&self) -> Result<String, QuoteError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn text_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .set_header(header.iter().map(|label| Cell::new(label)).collect::<Vec<Cell>>());
    table
}

fn align_right(table: &mut Table, columns: &[usize]) {
    for index in columns {
        if let Some(column) = table.column_mut(*index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
}
