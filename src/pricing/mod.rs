//! # Option Pricing
//!
//! Prices the add-on options chosen for a vehicle. The option price table maps a
//! classification to the options offered under it; a quote multiplies each selected
//! option's unit price by its quantity and adds the vehicle's base price.
//!
//! All amounts are whole NT$ held in `u64`; every sum is overflow-checked.
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

pub mod form;
pub mod selection;
pub mod table;

pub use form::QuoteForm;
pub use selection::Quantity;
pub use selection::Selection;
pub use table::Availability;
pub use table::OptionSet;
pub use table::PriceTable;

/// Maximum number of options a single quote may carry.
pub const MAX_SELECTIONS: usize = 5;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PricingError {
    #[error("Quantity {0} out of range, expected {min} to {max}", min = Quantity::MIN, max = Quantity::MAX)]
    QuantityOutOfRange(i64),

    #[error("Invalid selection '{0}', expected NAME or NAME:QTY")]
    InvalidSelection(String),

    #[error("At most {max} options per quote, got {0}", max = MAX_SELECTIONS)]
    TooManySelections(usize),

    #[error("Option '{0}' is not offered for classification '{1}'")]
    OptionNotOffered(String, String),

    #[error("No options are offered for classification '{0}'")]
    NoOptionsAvailable(String),

    #[error("Option '{0}' selected more than once")]
    DuplicateSelection(String),

    #[error("Quote total overflows")]
    Overflow,

    #[error("Price table '{0}' sheet '{1}' has {2} option columns, at most {max} are supported", max = table::MAX_OPTIONS)]
    TooManyOptions(String, String, usize),

    #[error("Invalid price in '{0}' sheet '{1}' at {2}: {3}")]
    InvalidPrice(String, String, String, String),

    #[error("Selection index {0} out of range")]
    SelectionIndexOutOfRange(usize),
}

/// Treatment of an option selected more than once in the same quote.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// A repeated option is an error
    #[default]
    Reject,
    /// Each repetition is its own line item
    Sum,
}

/// One priced selection of a quote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LineItem {
    pub option: String,
    pub unit_price: u64,
    pub quantity: Quantity,
    pub subtotal: u64,
}

/// The priced result for one vehicle classification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub classification: Option<String>,
    /// False when the classification has no priced option
    pub options_available: bool,
    pub base_price: Option<u64>,
    /// Line items in selection order
    pub items: Vec<LineItem>,
    /// Sum of the line item subtotals
    pub options_total: u64,
    /// Base price plus options total
    pub grand_total: u64,
}

/// Computes a quote for a classification.
///
/// # Arguments
/// * `table` - Option prices per classification
/// * `classification` - The vehicle's classification, `None` when it has none
/// * `base_price` - Base coating price, if the workbook carries one
/// * `selections` - Chosen options in display order
/// * `policy` - How a repeated option is treated
///
/// # Returns
/// The quote, or the first selection that cannot be priced
pub fn compute_quote(
    table: &PriceTable,
    classification: Option<&str>,
    base_price: Option<u64>,
    selections: &[Selection],
    policy: DuplicatePolicy,
) -> Result<Quote, PricingError> {
    if selections.len() > MAX_SELECTIONS {
        Err(PricingError::TooManySelections(selections.len()))?
    }

    let availability = match classification {
        Some(classification) => table.offered(classification),
        None => Availability::NoOptions,
    };
    let label = classification.unwrap_or_default();

    let mut items = Vec::<LineItem>::with_capacity(selections.len());
    for (index, selection) in selections.iter().enumerate() {
        let options = match availability {
            Availability::Options(options) => options,
            Availability::NoOptions => Err(PricingError::NoOptionsAvailable(label.to_owned()))?,
        };
        if policy == DuplicatePolicy::Reject && selections[..index].iter().any(|previous| previous.option == selection.option) {
            Err(PricingError::DuplicateSelection(selection.option.to_owned()))?
        }
        let unit_price = options
            .price(&selection.option)
            .ok_or_else(|| PricingError::OptionNotOffered(selection.option.to_owned(), label.to_owned()))?;
        let subtotal = unit_price
            .checked_mul(u64::from(selection.quantity.get()))
            .ok_or(PricingError::Overflow)?;
        items.push(LineItem {
            option: selection.option.to_owned(),
            unit_price,
            quantity: selection.quantity,
            subtotal,
        });
    }

    let options_total = items
        .iter()
        .try_fold(0u64, |total, item| total.checked_add(item.subtotal))
        .ok_or(PricingError::Overflow)?;
    let grand_total = base_price
        .unwrap_or_default()
        .checked_add(options_total)
        .ok_or(PricingError::Overflow)?;

    Ok(Quote {
        classification: classification.map(str::to_owned),
        options_available: matches!(availability, Availability::Options(_)),
        base_price,
        items,
        options_total,
        grand_total,
    })
}
