//! # Coating Quote
//!
//! Quotes car-coating jobs from the shop's reference workbook. The workbook carries two
//! views of the same data: a vehicle specification sheet (brand, model, dimensions and a
//! pricing classification) and an option price sheet mapping each classification to the
//! add-on services offered for it.
//!
//! ## Features
//!
//! - **Workbook reading**: `.xlsx`/`.xlsm` packages parsed straight from the zip, or `.csv`
//! - **Vehicle lookup**: cascading brand/model choice and the four-way brand/model filter
//! - **Option pricing**: up to five options per quote, quantities 1 to 10, exact totals
//! - **Quote sheets**: plain text or JSON, with thousands separators and an issue date
//!
//! ```no_run
//! use coating_quote::config::Settings;
//! use coating_quote::pricing::QuoteForm;
//! use coating_quote::workbook::Workbook;
//!
//! let mut settings = Settings::default();
//! settings.vehicles.file = Some("qiaosi.xlsx".into());
//! let workbook = Workbook::load(&settings)?;
//! let vehicle = workbook.catalog.find("Toyota", "Altis")?;
//!
//! let mut form = QuoteForm::new(&workbook.prices, settings.duplicate_policy);
//! form.set_vehicle(vehicle);
//! form.select("Wax:2".parse()?)?;
//! println!("{}", form.quote()?.grand_total);
//! # Ok::<(), coating_quote::error::QuoteError>(())
//! ```
pub mod catalog;
pub mod config;
pub mod error;
pub mod pricing;
pub mod render;
pub mod spreadsheet;
pub mod workbook;

pub(crate) mod helpers;

pub use error::QuoteError;
