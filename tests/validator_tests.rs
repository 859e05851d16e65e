//! Orchestrated validation: the offline save pass and the strict,
//! store-backed PDF pass.

use async_trait::async_trait;
use baumrechnung::auth::StaticAuth;
use baumrechnung::core::{InvoiceData, ServiceLine, Unit};
use baumrechnung::store::{
    InvoiceFilter, InvoiceStore, MemoryStore, StoreError, UserId,
};
use baumrechnung::validation::InvoiceValidator;
use chrono::NaiveDate;
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

/// Store whose every operation fails, for the fail-open contract.
struct BrokenStore;

#[async_trait]
impl InvoiceStore for BrokenStore {
    async fn insert(&self, _: &UserId, _: &InvoiceData) -> Result<String, StoreError> {
        Err(StoreError::Unavailable("offline".into()))
    }
    async fn update(&self, _: &UserId, _: &str, _: &InvoiceData) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("offline".into()))
    }
    async fn get(&self, _: &UserId, _: &str) -> Result<InvoiceData, StoreError> {
        Err(StoreError::Unavailable("offline".into()))
    }
    async fn find_by_number(&self, _: &UserId, _: &str) -> Result<Vec<InvoiceData>, StoreError> {
        Err(StoreError::Unavailable("offline".into()))
    }
    async fn list(&self, _: &UserId, _: &InvoiceFilter) -> Result<Vec<InvoiceData>, StoreError> {
        Err(StoreError::Unavailable("offline".into()))
    }
}

#[tokio::test]
async fn a_valid_invoice_passes_the_pdf_gate() {
    let store = MemoryStore::new();
    let auth = StaticAuth::signed_in("alice");
    let mut v = validator();
    let report = v.validate_for_pdf(&valid_invoice(), &auth, &store).await;
    assert!(report.is_valid(), "{:?}", report.errors);
    assert!(report.warnings.is_empty());
}

#[tokio::test]
async fn signed_out_users_get_a_single_auth_error() {
    let store = MemoryStore::new();
    let auth = StaticAuth::signed_out();
    let mut v = validator();

    let mut invoice = valid_invoice();
    invoice.customer_name = String::new();
    let report = v.validate_for_pdf(&invoice, &auth, &store).await;

    assert_eq!(report.errors.len(), 1);
    assert_eq!(
        report.errors.get("auth").map(String::as_str),
        Some("Sie müssen angemeldet sein, um PDFs zu generieren.")
    );
}

#[tokio::test]
async fn duplicate_invoice_number_for_the_same_user_is_rejected() {
    let store = MemoryStore::new();
    let alice = UserId::new("alice");
    let auth = StaticAuth::signed_in("alice");
    store.insert(&alice, &valid_invoice()).await.unwrap();

    // Different document, same number, no id yet.
    let mut v = validator();
    let report = v.validate_for_pdf(&valid_invoice(), &auth, &store).await;
    assert_eq!(
        report.errors.get("invoiceNumber").map(String::as_str),
        Some("Rechnungsnummer wird bereits verwendet")
    );
}

#[tokio::test]
async fn editing_an_invoice_does_not_collide_with_itself() {
    let store = MemoryStore::new();
    let alice = UserId::new("alice");
    let auth = StaticAuth::signed_in("alice");
    let id = store.insert(&alice, &valid_invoice()).await.unwrap();

    let mut invoice = valid_invoice();
    invoice.id = Some(id);
    let mut v = validator();
    let report = v.validate_for_pdf(&invoice, &auth, &store).await;
    assert!(report.is_valid(), "{:?}", report.errors);
}

#[tokio::test]
async fn the_same_number_is_free_for_another_user() {
    let store = MemoryStore::new();
    let bob = UserId::new("bob");
    let auth = StaticAuth::signed_in("alice");
    store.insert(&bob, &valid_invoice()).await.unwrap();

    let mut v = validator();
    let report = v.validate_for_pdf(&valid_invoice(), &auth, &store).await;
    assert!(report.is_valid(), "{:?}", report.errors);
}

#[tokio::test]
async fn uniqueness_fails_open_when_the_store_errors() {
    let auth = StaticAuth::signed_in("alice");
    let mut v = validator();
    let report = v.validate_for_pdf(&valid_invoice(), &auth, &BrokenStore).await;
    assert!(report.is_valid(), "{:?}", report.errors);
}

#[tokio::test]
async fn placeholder_customer_fails_despite_legal_schema() {
    let store = MemoryStore::new();
    let auth = StaticAuth::signed_in("alice");
    let mut invoice = valid_invoice();
    // Passes the letters-only name rule, fails the placeholder screen.
    invoice.customer_name = "Max Mustermann".into();

    let mut v = validator();
    let report = v.validate_for_pdf(&invoice, &auth, &store).await;
    assert_eq!(
        report.errors.get("customer").map(String::as_str),
        Some("Bitte geben Sie einen echten Kundennamen ein")
    );
    assert_eq!(
        report.errors.get("dataQuality").map(String::as_str),
        Some("Bitte verwenden Sie keine Platzhalterdaten in der Rechnung.")
    );
}

#[tokio::test]
async fn placeholder_name_inside_a_company_name_is_caught() {
    let store = MemoryStore::new();
    let auth = StaticAuth::signed_in("alice");
    let mut invoice = valid_invoice();
    invoice.customer_name = "Firma Max Mustermann GmbH".into();

    let mut v = validator();
    let report = v.validate_for_pdf(&invoice, &auth, &store).await;
    assert_eq!(
        report.errors.get("customer").map(String::as_str),
        Some("Bitte geben Sie einen echten Kundennamen ein")
    );
    assert!(report.errors.contains_key("dataQuality"));
}

#[tokio::test]
async fn placeholder_line_description_blocks_pdf_generation() {
    let store = MemoryStore::new();
    let auth = StaticAuth::signed_in("alice");
    let mut invoice = valid_invoice();
    invoice.update_line("1", |l| {
        l.description = "Platzhalter für spätere Leistung".into();
    });

    let mut v = validator();
    let report = v.validate_for_pdf(&invoice, &auth, &store).await;
    assert_eq!(
        report.errors.get("dataQuality").map(String::as_str),
        Some("Bitte verwenden Sie keine Platzhalterdaten in der Rechnung.")
    );
}

#[tokio::test]
async fn large_totals_warn_but_do_not_block() {
    let store = MemoryStore::new();
    let auth = StaticAuth::signed_in("alice");
    let mut invoice = valid_invoice();
    invoice.lines = vec![ServiceLine::new(
        "1",
        "Rodung Gewerbegrundstück",
        dec!(63_025.21),
        dec!(1),
        Unit::FlatRate,
    )];
    invoice.recalculate();
    // 63025.21 × 1.19 = 75000.00
    assert_eq!(invoice.total_amount, dec!(75_000.00));

    let mut v = validator();
    let report = v.validate_for_pdf(&invoice, &auth, &store).await;
    assert!(report.is_valid(), "{:?}", report.errors);
    assert_eq!(
        report.warnings,
        ["Bei Beträgen über 50.000 € nehmen Sie bitte Rücksprache."]
    );
}

#[tokio::test]
async fn zero_total_blocks_pdf_generation() {
    let store = MemoryStore::new();
    let auth = StaticAuth::signed_in("alice");
    let mut invoice = valid_invoice();
    invoice.lines.clear();
    invoice.recalculate();

    let mut v = validator();
    let report = v.validate_for_pdf(&invoice, &auth, &store).await;
    assert_eq!(
        report.errors.get("totalAmount").map(String::as_str),
        Some("Rechnungsbetrag muss größer als 0 sein.")
    );
}

#[tokio::test]
async fn pdf_validation_is_idempotent() {
    let store = MemoryStore::new();
    let auth = StaticAuth::signed_in("alice");
    let mut invoice = valid_invoice();
    invoice.customer_name = "Testkunde".into();

    let mut v = validator();
    let first = v.validate_for_pdf(&invoice, &auth, &store).await;
    let second = v.validate_for_pdf(&invoice, &auth, &store).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn flipping_one_field_produces_exactly_one_new_error() {
    let store = MemoryStore::new();
    let auth = StaticAuth::signed_in("alice");
    let mut v = validator();

    let mut invoice = valid_invoice();
    invoice.object = String::new();
    let report = v.validate_for_pdf(&invoice, &auth, &store).await;
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors.contains_key("object"));
    assert_eq!(report.first_error_field(), Some("object"));
}

#[tokio::test]
async fn focus_goes_to_the_invoice_number_first() {
    let store = MemoryStore::new();
    let auth = StaticAuth::signed_in("alice");
    let mut v = validator();

    let mut invoice = valid_invoice();
    invoice.invoice_number = "nr 1".into();
    invoice.object = String::new();
    invoice.customer_address = "kurz".into();
    let report = v.validate_for_pdf(&invoice, &auth, &store).await;
    assert_eq!(report.first_error_field(), Some("invoiceNumber"));
}
