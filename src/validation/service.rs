//! Validation orchestrator.
//!
//! [`InvoiceValidator`] is created per editing session and combines the
//! schema, placeholder and business layers into the two entry points
//! the application uses: a fast offline pass before saving a draft, and
//! the strict store-backed pass before a PDF may be generated.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::auth::AuthProvider;
use crate::core::dates::parse_german_date;
use crate::core::types::InvoiceData;
use crate::store::InvoiceStore;

use super::{ValidationReport, placeholder, rules, schema};

/// Gross totals above this trigger a review warning during PDF
/// validation. Warnings never block.
const REVIEW_THRESHOLD: Decimal = dec!(50_000);

/// Per-session validator with its own touched-field bookkeeping.
///
/// Two validators never share state; errors shown in one form session
/// cannot leak into another. `today` is fixed at construction so a
/// session close to midnight validates consistently, and so tests can
/// pin the calendar.
#[derive(Debug, Clone)]
pub struct InvoiceValidator {
    today: NaiveDate,
    touched: BTreeSet<String>,
    last_errors: BTreeMap<String, String>,
}

impl InvoiceValidator {
    /// A validator anchored to the local calendar date.
    pub fn new() -> Self {
        Self::with_today(chrono::Local::now().date_naive())
    }

    /// A validator with a pinned reference date.
    pub fn with_today(today: NaiveDate) -> Self {
        Self {
            today,
            touched: BTreeSet::new(),
            last_errors: BTreeMap::new(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Mark a field as touched by the user. Untouched fields keep their
    /// errors out of [`errors_to_show`](Self::errors_to_show) until the
    /// user has visited them or a full submit happens.
    pub fn touch(&mut self, field: impl Into<String>) {
        self.touched.insert(field.into());
    }

    /// Mark every field as relevant, as a submit attempt does.
    pub fn touch_all(&mut self) {
        self.touched.insert("*".into());
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.last_errors.contains_key(field)
    }

    pub fn error_message(&self, field: &str) -> Option<&str> {
        self.last_errors.get(field).map(String::as_str)
    }

    /// Drop a remembered error, e.g. after the user edits the field.
    pub fn clear_error(&mut self, field: &str) {
        self.last_errors.remove(field);
    }

    /// Errors from the last pass, filtered to touched fields.
    pub fn errors_to_show(&self) -> BTreeMap<&str, &str> {
        let show_all = self.touched.contains("*");
        self.last_errors
            .iter()
            .filter(|(field, _)| show_all || self.touched.contains(*field))
            .map(|(f, m)| (f.as_str(), m.as_str()))
            .collect()
    }

    /// Offline pass used before saving a draft.
    ///
    /// Checks data integrity (required fields, date formats, amount
    /// consistency) and the business rules that need no store access.
    /// Totals over the plausibility ceiling and placeholder content do
    /// not block a draft save; they surface as warnings. Per-line
    /// findings are capped at two and joined with `" | "` under
    /// `line_<id>`.
    pub fn validate_for_save(&mut self, invoice: &InvoiceData) -> ValidationReport {
        let mut report = ValidationReport::new();

        if invoice.invoice_number.trim().is_empty() {
            report.add("invoiceNumber", "Rechnungsnummer ist erforderlich.");
        }
        if invoice.object.trim().is_empty() {
            report.add("object", "Objekt-Beschreibung ist erforderlich.");
        }
        if invoice.customer_name.trim().is_empty() {
            report.add("customerName", "Kundenname ist erforderlich.");
        }
        if invoice.customer_address.trim().is_empty() {
            report.add("customerAddress", "Kundenadresse ist erforderlich.");
        }
        if parse_german_date(&invoice.date).is_none() {
            report.add("date", "Rechnungsdatum muss im Format TT.MM.JJJJ vorliegen.");
        } else if let Err(msg) = rules::check_issue_date(&invoice.date, self.today) {
            report.add("date", msg);
        }
        if parse_german_date(&invoice.due_date).is_none() {
            report.add(
                "dueDate",
                "Fälligkeitsdatum muss im Format TT.MM.JJJJ vorliegen.",
            );
        } else if let Err(msg) = rules::check_due_date(&invoice.date, &invoice.due_date) {
            report.add("dueDate", msg);
        }

        if invoice.lines.is_empty() {
            report.add("lines", "Mindestens eine Leistungsposition ist erforderlich.");
        }
        for line in &invoice.lines {
            let mut findings: Vec<&str> = Vec::new();
            let description = line.description.trim();
            if description.is_empty() {
                findings.push("Beschreibung ist erforderlich");
            } else if description.chars().count() < 3 {
                findings.push("Beschreibung zu kurz (mind. 3 Zeichen)");
            }
            if line.quantity <= Decimal::ZERO {
                findings.push("Menge muss größer als 0 sein");
            }
            if line.unit_price <= Decimal::ZERO {
                findings.push("Einzelpreis muss größer als 0 sein");
            }
            let expected = crate::core::calc::line_total(line.unit_price, line.quantity);
            if (line.total - expected).abs() > dec!(0.01) {
                findings.push("Gesamtpreis-Berechnung ist falsch");
            }
            if !findings.is_empty() {
                findings.truncate(2);
                report.add(format!("line_{}", line.id), findings.join(" | "));
            }
        }

        if let Err(msg) = rules::check_amount_consistency(invoice) {
            report.add("amounts", msg);
        }
        if invoice.total_amount > rules::MAX_PLAUSIBLE_TOTAL {
            report.warn("Gesamtbetrag scheint ungewöhnlich hoch zu sein");
        }
        if self.has_placeholder_content(invoice) {
            report.warn("Die Rechnung enthält Platzhalterdaten");
        }

        self.last_errors = report.errors.clone();
        report
    }

    /// Strict pass required before a PDF may be generated.
    ///
    /// An unauthenticated caller gets a single `auth` error and nothing
    /// else runs. Otherwise the full schema, every business rule
    /// (uniqueness included) and the placeholder screen apply, the
    /// total must be positive, and totals above 50 000 € add a
    /// non-blocking review warning.
    pub async fn validate_for_pdf(
        &mut self,
        invoice: &InvoiceData,
        auth: &dyn AuthProvider,
        store: &dyn InvoiceStore,
    ) -> ValidationReport {
        let mut report = ValidationReport::new();

        let Some(user) = auth.current_user() else {
            report.add("auth", "Sie müssen angemeldet sein, um PDFs zu generieren.");
            self.last_errors = report.errors.clone();
            return report;
        };

        report.extend(schema::check_invoice(invoice));
        for (field, message) in
            rules::check_complete_invoice(invoice, store, &user, self.today).await
        {
            report.add(field, message);
        }

        if invoice.total_amount <= Decimal::ZERO {
            report.add("totalAmount", "Rechnungsbetrag muss größer als 0 sein.");
        } else if invoice.total_amount > REVIEW_THRESHOLD {
            report.warn("Bei Beträgen über 50.000 € nehmen Sie bitte Rücksprache.");
        }

        if self.has_placeholder_content(invoice) {
            report.add(
                "dataQuality",
                "Bitte verwenden Sie keine Platzhalterdaten in der Rechnung.",
            );
        }

        self.last_errors = report.errors.clone();
        report
    }

    fn has_placeholder_content(&self, invoice: &InvoiceData) -> bool {
        placeholder::is_placeholder_name(&invoice.customer_name)
            || placeholder::contains_placeholder(&invoice.customer_address)
            || placeholder::contains_placeholder(&invoice.object)
            || invoice
                .lines
                .iter()
                .any(|l| placeholder::contains_placeholder(&l.description))
    }
}

impl Default for InvoiceValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{ServiceLine, Unit};
    use rust_decimal_macros::dec;

    fn validator() -> InvoiceValidator {
        InvoiceValidator::with_today(NaiveDate::from_ymd_opt(2025, 6, 15).unwrap())
    }

    fn valid_invoice() -> InvoiceData {
        let mut invoice = InvoiceData::new("04138-25", "15.06.2025", "25.06.2025");
        invoice.object = "Baumfällung in Schlangenbad".into();
        invoice.customer_name = "Erika Baumgartner".into();
        invoice.customer_address = "Hauptstr. 5, 65388 Schlangenbad".into();
        invoice.lines = vec![ServiceLine::new(
            "1",
            "Baumpflegearbeiten",
            dec!(150),
            dec!(1),
            Unit::FlatRate,
        )];
        invoice.recalculate();
        invoice
    }

    #[test]
    fn valid_draft_passes_save_validation() {
        let mut v = validator();
        let report = v.validate_for_save(&valid_invoice());
        assert!(report.is_valid(), "{:?}", report.errors);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn save_errors_are_isolated_per_field() {
        let mut v = validator();
        let mut invoice = valid_invoice();
        invoice.customer_name = String::new();
        let report = v.validate_for_save(&invoice);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(
            report.errors.get("customerName").map(String::as_str),
            Some("Kundenname ist erforderlich.")
        );
    }

    #[test]
    fn line_findings_are_capped_and_joined() {
        let mut v = validator();
        let mut invoice = valid_invoice();
        invoice.lines[0] = ServiceLine::new("7", "", Decimal::ZERO, Decimal::ZERO, Unit::Hours);
        let report = v.validate_for_save(&invoice);
        assert_eq!(
            report.errors.get("line_7").map(String::as_str),
            Some("Beschreibung ist erforderlich | Menge muss größer als 0 sein")
        );
    }

    #[test]
    fn save_validation_is_idempotent() {
        let mut v = validator();
        let invoice = valid_invoice();
        let first = v.validate_for_save(&invoice);
        let second = v.validate_for_save(&invoice);
        assert_eq!(first, second);
    }

    #[test]
    fn touched_filter_hides_unvisited_fields() {
        let mut v = validator();
        let mut invoice = valid_invoice();
        invoice.customer_name = String::new();
        invoice.object = String::new();
        v.validate_for_save(&invoice);

        assert!(v.errors_to_show().is_empty());
        v.touch("object");
        assert_eq!(v.errors_to_show().len(), 1);
        v.touch_all();
        assert_eq!(v.errors_to_show().len(), 2);
        assert!(v.has_error("customerName"));
        v.clear_error("customerName");
        assert!(!v.has_error("customerName"));
    }

    #[test]
    fn inconsistent_amounts_block_a_save() {
        let mut v = validator();
        let mut invoice = valid_invoice();
        invoice.vat_amount = dec!(99.99);
        let report = v.validate_for_save(&invoice);
        assert_eq!(
            report.errors.get("amounts").map(String::as_str),
            Some("MwSt.-Berechnung stimmt nicht überein")
        );

        let mut invoice = valid_invoice();
        invoice.subtotal = dec!(-150);
        let report = v.validate_for_save(&invoice);
        assert_eq!(
            report.errors.get("amounts").map(String::as_str),
            Some("Beträge dürfen nicht negativ sein")
        );
    }

    #[test]
    fn placeholder_line_descriptions_count_as_placeholder_content() {
        let mut v = validator();
        let mut invoice = valid_invoice();
        invoice.update_line("1", |l| {
            l.description = "Platzhalter für spätere Leistung".into();
        });
        let report = v.validate_for_save(&invoice);
        assert!(report.is_valid());
        assert_eq!(
            report.warnings,
            ["Die Rechnung enthält Platzhalterdaten"]
        );
    }

    #[test]
    fn oversized_total_is_a_warning_when_saving() {
        let mut v = validator();
        let mut invoice = valid_invoice();
        invoice.lines[0] = ServiceLine::new(
            "1",
            "Großauftrag Rodung",
            dec!(90_000),
            dec!(1),
            Unit::FlatRate,
        );
        invoice.recalculate();
        let report = v.validate_for_save(&invoice);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
    }
}
