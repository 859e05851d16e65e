use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::calc;

/// Unit of measure for a service line. Closed enumeration; no other
/// values are accepted anywhere in the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    /// "Stunden", billed by the hour.
    #[serde(rename = "Stunden")]
    Hours,
    /// "Stück", billed per piece.
    #[serde(rename = "Stück")]
    Pieces,
    /// "pauschal", flat rate for the whole job.
    #[serde(rename = "pauschal")]
    FlatRate,
}

impl Unit {
    /// The German label used on forms and invoices.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Hours => "Stunden",
            Self::Pieces => "Stück",
            Self::FlatRate => "pauschal",
        }
    }

    /// Parse from the German label.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "Stunden" => Some(Self::Hours),
            "Stück" => Some(Self::Pieces),
            "pauschal" => Some(Self::FlatRate),
            _ => None,
        }
    }

    /// Plausibility ceiling for the quantity, if the unit has one.
    /// More than 40 hours or 1000 pieces on a single line is treated as
    /// a data-entry mistake by the business rules.
    pub fn plausible_quantity_limit(&self) -> Option<Decimal> {
        match self {
            Self::Hours => Some(dec!(40)),
            Self::Pieces => Some(dec!(1000)),
            Self::FlatRate => None,
        }
    }
}

/// One billable row on an invoice.
///
/// `total` is derived: it always equals `unit_price × quantity` rounded
/// to two decimal places. It is maintained by [`ServiceLine::new`] and
/// [`InvoiceData::recalculate`]; validation rejects drift above one cent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceLine {
    /// Stable within one invoice across edits, not globally meaningful.
    pub id: String,
    pub description: String,
    pub unit_price: Decimal,
    pub quantity: Decimal,
    pub unit: Unit,
    pub total: Decimal,
}

impl ServiceLine {
    /// Create a line with its total already computed.
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        unit_price: Decimal,
        quantity: Decimal,
        unit: Unit,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            unit_price,
            quantity,
            unit,
            total: calc::line_total(unit_price, quantity),
        }
    }
}

/// Invoice lifecycle status. One-directional:
/// `Draft → Finalized` once validation for PDF passes,
/// `Finalized → Paid` by explicit user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Finalized,
    Paid,
}

impl InvoiceStatus {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Finalized => "finalized",
            Self::Paid => "paid",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "draft" => Some(Self::Draft),
            "finalized" => Some(Self::Finalized),
            "paid" => Some(Self::Paid),
            _ => None,
        }
    }

    /// Whether the transition `self → to` is allowed.
    pub fn can_transition(&self, to: InvoiceStatus) -> bool {
        matches!(
            (self, to),
            (Self::Draft, Self::Finalized) | (Self::Finalized, Self::Paid)
        )
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// The invoice document as persisted and edited.
///
/// Dates are carried as `dd.MM.yyyy` strings, the form and storage
/// format; [`crate::core::dates`] converts and validates them.
/// `subtotal`, `vat_amount` and `total_amount` are derived from the
/// lines and must never be set independently. Call
/// [`InvoiceData::recalculate`] after any line change, or use the line
/// mutation helpers which do it for you.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    pub invoice_number: String,
    pub status: InvoiceStatus,
    /// Issue date, `dd.MM.yyyy`.
    pub date: String,
    /// Job description ("Objekt"), e.g. "Baumfällung in Schlangenbad".
    pub object: String,
    /// Denormalized customer snapshot, kept for historical accuracy
    /// after the customer record changes.
    pub customer_name: String,
    pub customer_address: String,
    pub lines: Vec<ServiceLine>,
    pub subtotal: Decimal,
    pub vat_amount: Decimal,
    pub total_amount: Decimal,
    /// Payment due date, `dd.MM.yyyy`.
    pub due_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finalized_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<String>,
}

impl InvoiceData {
    /// A fresh draft with one empty flat-rate line, mirroring the state
    /// a new invoice form starts from.
    pub fn new(
        invoice_number: impl Into<String>,
        date: impl Into<String>,
        due_date: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            customer_id: None,
            invoice_number: invoice_number.into(),
            status: InvoiceStatus::Draft,
            date: date.into(),
            object: String::new(),
            customer_name: String::new(),
            customer_address: String::new(),
            lines: vec![ServiceLine::new(
                "1",
                "",
                Decimal::ZERO,
                dec!(1),
                Unit::FlatRate,
            )],
            subtotal: Decimal::ZERO,
            vat_amount: Decimal::ZERO,
            total_amount: Decimal::ZERO,
            due_date: due_date.into(),
            created_at: None,
            updated_at: None,
            finalized_at: None,
            paid_at: None,
        }
    }

    /// Recompute every line total and the invoice aggregate. Idempotent.
    pub fn recalculate(&mut self) {
        for line in &mut self.lines {
            line.total = calc::line_total(line.unit_price, line.quantity);
        }
        let totals = calc::invoice_totals(&self.lines);
        self.subtotal = totals.subtotal;
        self.vat_amount = totals.vat_amount;
        self.total_amount = totals.total_amount;
    }

    /// Append a line and recalculate.
    pub fn add_line(&mut self, line: ServiceLine) {
        self.lines.push(line);
        self.recalculate();
    }

    /// Mutate the line with the given id, then recalculate. Returns
    /// false if no such line exists.
    pub fn update_line(&mut self, id: &str, edit: impl FnOnce(&mut ServiceLine)) -> bool {
        let Some(line) = self.lines.iter_mut().find(|l| l.id == id) else {
            return false;
        };
        edit(line);
        self.recalculate();
        true
    }

    /// Remove the line with the given id and recalculate. The last
    /// remaining line cannot be removed; an invoice always keeps at
    /// least one row.
    pub fn remove_line(&mut self, id: &str) -> bool {
        if self.lines.len() <= 1 {
            return false;
        }
        let before = self.lines.len();
        self.lines.retain(|l| l.id != id);
        if self.lines.len() == before {
            return false;
        }
        self.recalculate();
        true
    }
}

/// A customer record, owned by exactly one authenticated user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Customer {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: None,
            phone: None,
            address: address.into(),
            created_at: None,
            updated_at: None,
        }
    }
}

/// Static letterhead and payment metadata of the invoicing business,
/// handed to the renderer alongside the invoice snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SenderProfile {
    pub company_name: String,
    /// Service lines printed under the company name on the letterhead.
    pub taglines: Vec<String>,
    pub owner: String,
    pub street: String,
    /// Postal code and city, e.g. "65388 Schlangenbad".
    pub city: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_number: Option<String>,
    pub bank: BankDetails,
}

/// Bank account printed in the invoice footer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankDetails {
    pub account_holder: String,
    pub iban: String,
    pub bic: String,
    pub bank_name: String,
}
