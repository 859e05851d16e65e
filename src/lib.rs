//! Invoicing core for a small German tree-care business.
//!
//! Customers, invoice line items with 19 % VAT, layered validation and
//! PDF export. Amounts are [`rust_decimal::Decimal`] throughout; dates
//! travel as `dd.MM.yyyy` strings, the format users type and the stores
//! persist.
//!
//! Validation is split in three layers: field schema checks
//! ([`validation::schema`]), business plausibility rules
//! ([`validation::rules`]) and the per-session orchestrator
//! ([`validation::InvoiceValidator`]) with its offline save pass and
//! its strict, store-backed PDF pass. Stores and authentication sit
//! behind traits; [`store::MemoryStore`] and [`auth::StaticAuth`] serve
//! tests and examples.
//!
//! ```
//! use baumrechnung::core::{InvoiceData, ServiceLine, Unit};
//! use baumrechnung::validation::InvoiceValidator;
//! use rust_decimal_macros::dec;
//!
//! let mut invoice = InvoiceData::new("04138-25", "15.06.2025", "25.06.2025");
//! invoice.object = "Baumfällung in Schlangenbad".into();
//! invoice.customer_name = "Erika Baumgartner".into();
//! invoice.customer_address = "Hauptstr. 5, 65388 Schlangenbad".into();
//! invoice.lines = vec![ServiceLine::new(
//!     "1",
//!     "Baumpflegearbeiten",
//!     dec!(150),
//!     dec!(1),
//!     Unit::FlatRate,
//! )];
//! invoice.recalculate();
//! assert_eq!(invoice.total_amount, dec!(178.50));
//!
//! let today = chrono::NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
//! let mut validator = InvoiceValidator::with_today(today);
//! let report = validator.validate_for_save(&invoice);
//! assert!(report.is_valid());
//! ```

pub mod auth;
pub mod core;
pub mod render;
pub mod store;
pub mod validation;
pub mod workflow;

pub use crate::core::{
    InvoiceData, InvoiceError, InvoiceStatus, ServiceLine, Unit, VAT_RATE,
};
pub use crate::validation::{InvoiceValidator, ValidationReport};
