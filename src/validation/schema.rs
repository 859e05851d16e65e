//! Field-level schema validation.
//!
//! Pure checks over formats and ranges, no I/O. Every violation is
//! collected; a single pass reports all problems of a document.
//!
//! The loose draft types at the bottom absorb untyped form or JSON
//! input (numbers as strings, German comma decimals) and normalize it
//! into the strict domain types before the range checks run.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use crate::core::dates::parse_german_date;
use crate::core::types::{Customer, InvoiceData, ServiceLine, Unit};

use super::ValidationError;

const MAX_LINES: usize = 50;
const MAX_UNIT_PRICE: Decimal = dec!(999_999.99);
const MAX_QUANTITY: Decimal = dec!(9_999);
const MAX_NET_OR_GROSS: Decimal = dec!(9_999_999.99);
const MAX_VAT: Decimal = dec!(999_999.99);

fn is_invoice_number_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphabetic()
        || matches!(c, 'ä' | 'ö' | 'ü' | 'Ä' | 'Ö' | 'Ü' | 'ß' | ' ' | '-' | '.')
}

fn is_phone_like(value: &str) -> bool {
    let rest = value.strip_prefix('+').unwrap_or(value);
    !rest.is_empty()
        && rest
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'))
}

fn is_email_like(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.contains(' ')
}

/// Check every field of an invoice, collecting all violations.
pub fn check_invoice(invoice: &InvoiceData) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let number = invoice.invoice_number.trim();
    if number.is_empty() {
        errors.push(ValidationError::new(
            "invoiceNumber",
            "Rechnungsnummer ist erforderlich",
        ));
    } else if number.chars().count() > 50 {
        errors.push(ValidationError::new(
            "invoiceNumber",
            "Rechnungsnummer darf maximal 50 Zeichen lang sein",
        ));
    } else if !number.chars().all(is_invoice_number_char) {
        errors.push(ValidationError::new(
            "invoiceNumber",
            "Rechnungsnummer darf nur Buchstaben, Zahlen, Bindestriche, Unterstriche und Punkte enthalten",
        ));
    }

    let issue = parse_german_date(&invoice.date);
    if issue.is_none() {
        errors.push(ValidationError::new(
            "date",
            "Rechnungsdatum muss ein gültiges Datum im Format TT.MM.JJJJ sein",
        ));
    }
    match parse_german_date(&invoice.due_date) {
        None => errors.push(ValidationError::new(
            "dueDate",
            "Fälligkeitsdatum muss ein gültiges Datum im Format TT.MM.JJJJ sein",
        )),
        Some(due) => {
            if let Some(issue) = issue
                && due < issue
            {
                errors.push(ValidationError::new(
                    "dueDate",
                    "Fälligkeitsdatum darf nicht vor dem Rechnungsdatum liegen",
                ));
            }
        }
    }

    let object = invoice.object.trim();
    if object.is_empty() {
        errors.push(ValidationError::new(
            "object",
            "Objekt-Beschreibung ist erforderlich",
        ));
    } else if object.chars().count() > 200 {
        errors.push(ValidationError::new(
            "object",
            "Objekt-Beschreibung darf maximal 200 Zeichen lang sein",
        ));
    }

    check_customer_name("customerName", &invoice.customer_name, &mut errors);
    check_customer_address("customerAddress", &invoice.customer_address, &mut errors);

    if invoice.lines.is_empty() {
        errors.push(ValidationError::new(
            "lines",
            "Mindestens eine Leistungsposition ist erforderlich",
        ));
    } else if invoice.lines.len() > MAX_LINES {
        errors.push(ValidationError::new(
            "lines",
            "Maximal 50 Leistungspositionen sind erlaubt",
        ));
    }
    for (i, line) in invoice.lines.iter().enumerate() {
        check_line(i, line, &mut errors);
    }

    if invoice.subtotal < Decimal::ZERO || invoice.subtotal > MAX_NET_OR_GROSS {
        errors.push(ValidationError::new(
            "subtotal",
            "Zwischensumme liegt außerhalb des gültigen Bereichs",
        ));
    }
    if invoice.vat_amount < Decimal::ZERO || invoice.vat_amount > MAX_VAT {
        errors.push(ValidationError::new(
            "vatAmount",
            "MwSt.-Betrag liegt außerhalb des gültigen Bereichs",
        ));
    }
    if invoice.total_amount < Decimal::ZERO || invoice.total_amount > MAX_NET_OR_GROSS {
        errors.push(ValidationError::new(
            "totalAmount",
            "Gesamtbetrag liegt außerhalb des gültigen Bereichs",
        ));
    }

    errors
}

fn check_line(index: usize, line: &ServiceLine, errors: &mut Vec<ValidationError>) {
    let field = |name: &str| format!("lines[{index}].{name}");

    let description = line.description.trim();
    if description.is_empty() {
        errors.push(ValidationError::new(
            field("description"),
            "Beschreibung ist erforderlich",
        ));
    } else if description.chars().count() > 500 {
        errors.push(ValidationError::new(
            field("description"),
            "Beschreibung darf maximal 500 Zeichen lang sein",
        ));
    }

    if line.unit_price <= Decimal::ZERO {
        errors.push(ValidationError::new(
            field("unitPrice"),
            "Einzelpreis muss größer als 0 sein",
        ));
    } else if line.unit_price > MAX_UNIT_PRICE {
        errors.push(ValidationError::new(
            field("unitPrice"),
            "Einzelpreis darf maximal 999.999,99 € betragen",
        ));
    }

    if line.quantity <= Decimal::ZERO {
        errors.push(ValidationError::new(
            field("quantity"),
            "Menge muss größer als 0 sein",
        ));
    } else if line.quantity > MAX_QUANTITY {
        errors.push(ValidationError::new(
            field("quantity"),
            "Menge darf maximal 9999 betragen",
        ));
    }
}

fn check_customer_name(field: &str, name: &str, errors: &mut Vec<ValidationError>) {
    let name = name.trim();
    if name.chars().count() < 2 {
        errors.push(ValidationError::new(
            field,
            "Name muss mindestens 2 Zeichen lang sein",
        ));
    } else if name.chars().count() > 100 {
        errors.push(ValidationError::new(
            field,
            "Name darf maximal 100 Zeichen lang sein",
        ));
    } else if !name.chars().all(is_name_char) {
        errors.push(ValidationError::new(
            field,
            "Name darf nur Buchstaben, Leerzeichen, Bindestriche und Punkte enthalten",
        ));
    }
}

fn check_customer_address(field: &str, address: &str, errors: &mut Vec<ValidationError>) {
    let address = address.trim();
    if address.chars().count() < 5 {
        errors.push(ValidationError::new(
            field,
            "Adresse muss mindestens 5 Zeichen lang sein",
        ));
    } else if address.chars().count() > 200 {
        errors.push(ValidationError::new(
            field,
            "Adresse darf maximal 200 Zeichen lang sein",
        ));
    }
}

/// Check a customer record, collecting all violations.
pub fn check_customer(customer: &Customer) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    check_customer_name("name", &customer.name, &mut errors);
    check_customer_address("address", &customer.address, &mut errors);
    if let Some(email) = customer.email.as_deref()
        && !email.trim().is_empty()
        && !is_email_like(email.trim())
    {
        errors.push(ValidationError::new(
            "email",
            "E-Mail-Adresse ist ungültig",
        ));
    }
    if let Some(phone) = customer.phone.as_deref()
        && !phone.trim().is_empty()
        && !is_phone_like(phone.trim())
    {
        errors.push(ValidationError::new(
            "phone",
            "Telefonnummer ist ungültig",
        ));
    }
    errors
}

/// A numeric field as it arrives from untyped input: a JSON number or
/// a string, possibly with a German decimal comma.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl NumericInput {
    /// Normalize into a `Decimal`. Strings are trimmed and a decimal
    /// comma is accepted ("1.234,56" is not; thousands separators stay
    /// unsupported).
    pub fn to_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Number(n) => Decimal::try_from(*n).ok(),
            Self::Text(s) => {
                let normalized = s.trim().replace(',', ".");
                if normalized.is_empty() {
                    return None;
                }
                normalized.parse().ok()
            }
        }
    }
}

/// A service line as typed into a form, before normalization.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceLineDraft {
    pub id: String,
    #[serde(default)]
    pub description: String,
    pub unit_price: NumericInput,
    pub quantity: NumericInput,
    pub unit: String,
}

impl ServiceLineDraft {
    fn parse(&self, index: usize, errors: &mut Vec<ValidationError>) -> Option<ServiceLine> {
        let field = |name: &str| format!("lines[{index}].{name}");

        let unit_price = self.unit_price.to_decimal();
        if unit_price.is_none() {
            errors.push(ValidationError::new(
                field("unitPrice"),
                "Einzelpreis ist keine gültige Zahl",
            ));
        }
        let quantity = self.quantity.to_decimal();
        if quantity.is_none() {
            errors.push(ValidationError::new(
                field("quantity"),
                "Menge ist keine gültige Zahl",
            ));
        }
        let unit = Unit::from_code(&self.unit);
        if unit.is_none() {
            errors.push(ValidationError::new(
                field("unit"),
                "Einheit muss Stunden, Stück oder pauschal sein",
            ));
        }

        Some(ServiceLine::new(
            self.id.clone(),
            self.description.clone(),
            unit_price?,
            quantity?,
            unit?,
        ))
    }
}

/// An invoice as it arrives from untyped input.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDraft {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
    pub invoice_number: String,
    pub date: String,
    pub due_date: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_address: String,
    #[serde(default)]
    pub lines: Vec<ServiceLineDraft>,
}

impl InvoiceDraft {
    /// Normalize into [`InvoiceData`] with freshly computed totals, or
    /// return every problem found. Field-format checks beyond numeric
    /// parseability are left to [`check_invoice`] on the result.
    pub fn parse(&self) -> Result<InvoiceData, Vec<ValidationError>> {
        let mut errors = Vec::new();
        let mut lines = Vec::with_capacity(self.lines.len());
        for (i, draft) in self.lines.iter().enumerate() {
            if let Some(line) = draft.parse(i, &mut errors) {
                lines.push(line);
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        let mut invoice = InvoiceData::new(
            self.invoice_number.trim(),
            self.date.trim(),
            self.due_date.trim(),
        );
        invoice.id = self.id.clone();
        invoice.customer_id = self.customer_id.clone();
        invoice.object = self.object.trim().to_string();
        invoice.customer_name = self.customer_name.trim().to_string();
        invoice.customer_address = self.customer_address.trim().to_string();
        invoice.lines = lines;
        invoice.recalculate();
        Ok(invoice)
    }
}

/// A customer as it arrives from untyped input.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDraft {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: String,
}

impl CustomerDraft {
    /// Normalize into [`Customer`], or return every schema violation.
    pub fn parse(&self) -> Result<Customer, Vec<ValidationError>> {
        let mut customer = Customer::new(self.name.trim(), self.address.trim());
        customer.id = self.id.clone();
        customer.email = self
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(String::from);
        customer.phone = self
            .phone
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from);

        let errors = check_customer(&customer);
        if errors.is_empty() {
            Ok(customer)
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_input_accepts_german_comma() {
        assert_eq!(
            NumericInput::Text("150,50".into()).to_decimal(),
            Some(dec!(150.50))
        );
        assert_eq!(
            NumericInput::Text(" 85.5 ".into()).to_decimal(),
            Some(dec!(85.5))
        );
        assert_eq!(NumericInput::Number(3.0).to_decimal(), Some(dec!(3)));
        assert_eq!(NumericInput::Text("".into()).to_decimal(), None);
        assert_eq!(NumericInput::Text("abc".into()).to_decimal(), None);
        assert_eq!(NumericInput::Text("1.234,56".into()).to_decimal(), None);
    }

    #[test]
    fn email_and_phone_shapes() {
        assert!(is_email_like("e.baumgartner@web.de"));
        assert!(!is_email_like("keinemail"));
        assert!(!is_email_like("a@b"));
        assert!(!is_email_like("a b@web.de"));
        assert!(is_phone_like("+49 6123 456789"));
        assert!(is_phone_like("(06123) 45 67-89"));
        assert!(!is_phone_like("ruf mich an"));
        assert!(!is_phone_like("+"));
    }
}
