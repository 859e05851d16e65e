//! Domain types, money arithmetic, dates and invoice numbering.

pub mod calc;
pub mod dates;
pub mod error;
pub mod numbering;
pub mod types;

pub use calc::{Totals, VAT_RATE, invoice_totals, line_total, round_half_up};
pub use dates::{days_between, format_german_date, is_german_date_format, parse_german_date};
pub use error::InvoiceError;
pub use numbering::InvoiceNumberSequence;
pub use types::{
    BankDetails, Customer, InvoiceData, InvoiceStatus, SenderProfile, ServiceLine, Unit,
};
