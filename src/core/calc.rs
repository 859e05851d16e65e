//! Money arithmetic for invoice lines and totals.
//!
//! All amounts are [`Decimal`]; rounding is commercial half-up
//! (midpoint away from zero), applied once per derived value.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use super::types::ServiceLine;

/// Statutory German VAT rate applied to every invoice.
///
/// The business bills all services at the full rate; per-line or
/// per-invoice rate selection is deliberately not supported.
pub const VAT_RATE: Decimal = dec!(0.19);

/// Round half-up to the given number of decimal places.
/// 1.005 rounds to 1.01, not 1.00.
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Net total of a single line: `unit_price × quantity`, rounded to cents.
pub fn line_total(unit_price: Decimal, quantity: Decimal) -> Decimal {
    round_half_up(unit_price * quantity, 2)
}

/// Aggregate amounts of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    /// Exact sum of the (already rounded) line totals.
    pub subtotal: Decimal,
    /// `subtotal × 0.19`, rounded to cents.
    pub vat_amount: Decimal,
    /// `subtotal + vat_amount`. No further rounding is needed.
    pub total_amount: Decimal,
}

/// Compute subtotal, VAT and gross total over a set of lines.
///
/// The empty set yields all-zero totals; invoice-level validation
/// rejects an invoice without lines before it can be saved or rendered.
pub fn invoice_totals(lines: &[ServiceLine]) -> Totals {
    let subtotal: Decimal = lines.iter().map(|l| l.total).sum();
    let vat_amount = round_half_up(subtotal * VAT_RATE, 2);
    Totals {
        subtotal,
        vat_amount,
        total_amount: subtotal + vat_amount,
    }
}
