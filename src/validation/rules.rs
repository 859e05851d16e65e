//! Business plausibility rules.
//!
//! These run after the schema checks and catch data that is formally
//! valid but commercially implausible: stale or future dates, duplicate
//! invoice numbers, amounts that disagree with the lines, and obvious
//! dummy content. Each rule yields at most one message; the aggregate
//! reports everything found in a single pass.

use std::collections::BTreeMap;

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::core::calc::{self, VAT_RATE};
use crate::core::dates::{days_between, parse_german_date};
use crate::core::types::{InvoiceData, ServiceLine};
use crate::store::{InvoiceStore, UserId};

use super::placeholder;

/// Largest invoice the business writes without manual review. Tighter
/// than the schema ceiling on purpose.
pub const MAX_PLAUSIBLE_TOTAL: Decimal = dec!(100_000);

/// Tolerance for recomputed amounts, one cent.
const AMOUNT_TOLERANCE: Decimal = dec!(0.01);

/// Whether `number` is free for this user, ignoring the invoice with
/// `exclude_id` (the one being edited).
///
/// Fails open: when the store itself errors, the number is treated as
/// unique so that a backend hiccup cannot block invoicing. The
/// definitive duplicate check is the store's own constraint at insert.
pub async fn is_invoice_number_unique(
    store: &dyn InvoiceStore,
    user: &UserId,
    number: &str,
    exclude_id: Option<&str>,
) -> bool {
    match store.find_by_number(user, number).await {
        Ok(matches) => matches
            .iter()
            .all(|inv| inv.id.as_deref() == exclude_id && exclude_id.is_some()),
        Err(_) => true,
    }
}

/// Issue date must lie within [today − 1 year, today + 1 month].
pub fn check_issue_date(date: &str, today: NaiveDate) -> Result<(), String> {
    let Some(date) = parse_german_date(date) else {
        return Err("Rechnungsdatum ist ungültig".into());
    };
    let one_year_ago = today - Months::new(12);
    let one_month_ahead = today + Months::new(1);
    if date < one_year_ago {
        return Err("Rechnungsdatum darf nicht älter als 1 Jahr sein".into());
    }
    if date > one_month_ahead {
        return Err("Rechnungsdatum darf maximal 1 Monat in der Zukunft liegen".into());
    }
    Ok(())
}

/// Due date must lie within [issue date, issue date + 365 days].
pub fn check_due_date(date: &str, due_date: &str) -> Result<(), String> {
    let (Some(issue), Some(due)) = (parse_german_date(date), parse_german_date(due_date)) else {
        return Err("Fälligkeitsdatum ist ungültig".into());
    };
    let days = days_between(issue, due);
    if days < 0 {
        return Err("Fälligkeitsdatum darf nicht vor dem Rechnungsdatum liegen".into());
    }
    if days > 365 {
        return Err("Fälligkeitsdatum darf maximal 1 Jahr nach Rechnungsdatum liegen".into());
    }
    Ok(())
}

/// Amounts must be non-negative and consistent with the fixed VAT
/// formula to within one cent. Applies in both validation passes; the
/// plausibility ceiling is only blocking for PDF generation.
pub fn check_amount_consistency(invoice: &InvoiceData) -> Result<(), String> {
    if invoice.subtotal < Decimal::ZERO
        || invoice.vat_amount < Decimal::ZERO
        || invoice.total_amount < Decimal::ZERO
    {
        return Err("Beträge dürfen nicht negativ sein".into());
    }
    let expected_vat = calc::round_half_up(invoice.subtotal * VAT_RATE, 2);
    let expected_total = invoice.subtotal + expected_vat;
    if (invoice.vat_amount - expected_vat).abs() > AMOUNT_TOLERANCE
        || (invoice.total_amount - expected_total).abs() > AMOUNT_TOLERANCE
    {
        return Err("MwSt.-Berechnung stimmt nicht überein".into());
    }
    Ok(())
}

/// Full amount rule: consistency plus the business ceiling on the
/// gross total.
pub fn check_amounts(invoice: &InvoiceData) -> Result<(), String> {
    check_amount_consistency(invoice)?;
    if invoice.total_amount > MAX_PLAUSIBLE_TOTAL {
        return Err("Gesamtbetrag scheint ungewöhnlich hoch zu sein".into());
    }
    Ok(())
}

/// First plausibility problem of a single line, if any.
pub fn check_line_plausibility(line: &ServiceLine) -> Result<(), String> {
    let description = line.description.trim();
    if description.chars().count() < 3 {
        return Err("Beschreibung zu kurz (mindestens 3 Zeichen)".into());
    }
    if placeholder::is_meaningless_description(description) {
        return Err("Beschreibung scheint nicht aussagekräftig zu sein".into());
    }
    if let Some(limit) = line.unit.plausible_quantity_limit()
        && line.quantity > limit
    {
        return Err(match line.unit {
            crate::core::Unit::Hours => "Ungewöhnlich hohe Stundenanzahl".into(),
            _ => "Ungewöhnlich hohe Stückzahl".into(),
        });
    }
    let expected = calc::line_total(line.unit_price, line.quantity);
    if (line.total - expected).abs() > AMOUNT_TOLERANCE {
        return Err("Gesamtpreis-Berechnung nicht korrekt".into());
    }
    Ok(())
}

/// Customer snapshot must not be placeholder data.
pub fn check_customer_data(name: &str, address: &str) -> Result<(), String> {
    if placeholder::is_placeholder_name(name) {
        return Err("Bitte geben Sie einen echten Kundennamen ein".into());
    }
    if placeholder::contains_placeholder(address) {
        return Err("Bitte geben Sie eine echte Adresse ein".into());
    }
    Ok(())
}

/// Customer email must not be a test mailbox.
pub fn check_customer_email(email: &str) -> Result<(), String> {
    if placeholder::is_test_email(email) {
        return Err("Bitte geben Sie eine echte E-Mail-Adresse ein".into());
    }
    Ok(())
}

/// Job description must not be placeholder content.
pub fn check_object(object: &str) -> Result<(), String> {
    if placeholder::contains_placeholder(object) {
        return Err("Bitte geben Sie eine echte Objekt-Beschreibung ein".into());
    }
    Ok(())
}

/// Run every business rule over a complete invoice, uniqueness check
/// included. Returns a field → message map; empty means plausible.
pub async fn check_complete_invoice(
    invoice: &InvoiceData,
    store: &dyn InvoiceStore,
    user: &UserId,
    today: NaiveDate,
) -> BTreeMap<String, String> {
    let mut errors = BTreeMap::new();

    if !is_invoice_number_unique(
        store,
        user,
        &invoice.invoice_number,
        invoice.id.as_deref(),
    )
    .await
    {
        errors.insert(
            "invoiceNumber".into(),
            "Rechnungsnummer wird bereits verwendet".into(),
        );
    }
    if let Err(msg) = check_issue_date(&invoice.date, today) {
        errors.insert("date".into(), msg);
    }
    if let Err(msg) = check_due_date(&invoice.date, &invoice.due_date) {
        errors.insert("dueDate".into(), msg);
    }
    if let Err(msg) = check_amounts(invoice) {
        errors.insert("amounts".into(), msg);
    }
    if let Err(msg) = check_customer_data(&invoice.customer_name, &invoice.customer_address) {
        errors.insert("customer".into(), msg);
    }
    if let Err(msg) = check_object(&invoice.object) {
        errors.insert("object".into(), msg);
    }
    for (i, line) in invoice.lines.iter().enumerate() {
        if let Err(msg) = check_line_plausibility(line) {
            errors.insert(format!("line_{i}"), msg);
        }
    }

    errors
}
