//! Field-level schema checks over whole invoices and loose drafts.

use baumrechnung::core::{InvoiceData, ServiceLine, Unit};
use baumrechnung::validation::schema::{InvoiceDraft, check_invoice, CustomerDraft};
use rust_decimal_macros::dec;

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

fn fields(invoice: &InvoiceData) -> Vec<String> {
    check_invoice(invoice).into_iter().map(|e| e.field).collect()
}

#[test]
fn a_complete_invoice_has_no_schema_errors() {
    assert!(check_invoice(&valid_invoice()).is_empty());
}

#[test]
fn invoice_number_charset_and_length() {
    let mut invoice = valid_invoice();
    invoice.invoice_number = "04138/25".into();
    assert_eq!(fields(&invoice), ["invoiceNumber"]);

    invoice.invoice_number = "A-1_b.2".into();
    assert!(check_invoice(&invoice).is_empty());

    invoice.invoice_number = "x".repeat(51);
    assert_eq!(fields(&invoice), ["invoiceNumber"]);

    invoice.invoice_number = String::new();
    assert_eq!(fields(&invoice), ["invoiceNumber"]);
}

#[test]
fn impossible_calendar_date_is_rejected() {
    let mut invoice = valid_invoice();
    invoice.date = "30.02.2025".into();
    assert_eq!(fields(&invoice), ["date"]);
}

#[test]
fn due_date_before_issue_date_is_rejected() {
    let mut invoice = valid_invoice();
    invoice.due_date = "14.06.2025".into();
    assert_eq!(fields(&invoice), ["dueDate"]);
}

#[test]
fn unit_price_boundary() {
    let mut invoice = valid_invoice();
    invoice.update_line("1", |l| l.unit_price = dec!(999_999.99));
    assert!(
        fields(&invoice)
            .iter()
            .all(|f| !f.contains("unitPrice"))
    );

    invoice.update_line("1", |l| l.unit_price = dec!(1_000_000.00));
    assert_eq!(fields(&invoice), ["lines[0].unitPrice"]);
}

#[test]
fn quantity_boundary() {
    let mut invoice = valid_invoice();
    invoice.update_line("1", |l| l.quantity = dec!(9_999));
    assert!(check_invoice(&invoice).is_empty());

    invoice.update_line("1", |l| l.quantity = dec!(10_000));
    assert_eq!(fields(&invoice), ["lines[0].quantity"]);

    invoice.update_line("1", |l| l.quantity = dec!(0));
    assert_eq!(fields(&invoice), ["lines[0].quantity"]);
}

#[test]
fn line_count_bounds() {
    let mut invoice = valid_invoice();
    invoice.lines.clear();
    invoice.recalculate();
    let found = fields(&invoice);
    assert!(found.contains(&"lines".to_string()));
    // Zero lines also zeroes the total, which stays schema-legal.
    assert!(!found.contains(&"totalAmount".to_string()));

    let mut invoice = valid_invoice();
    invoice.lines = (1..=51)
        .map(|i| {
            ServiceLine::new(
                i.to_string(),
                "Kronenschnitt",
                dec!(10),
                dec!(1),
                Unit::Pieces,
            )
        })
        .collect();
    invoice.recalculate();
    assert!(fields(&invoice).contains(&"lines".to_string()));
}

#[test]
fn length_limits_count_characters_not_bytes() {
    // 200 umlauts are 400 bytes but exactly at the character ceiling.
    let mut invoice = valid_invoice();
    invoice.object = "ü".repeat(200);
    assert!(check_invoice(&invoice).is_empty());
    invoice.object = "ü".repeat(201);
    assert_eq!(fields(&invoice), ["object"]);

    let mut invoice = valid_invoice();
    invoice.update_line("1", |l| l.description = "ö".repeat(500));
    assert!(check_invoice(&invoice).is_empty());
    invoice.update_line("1", |l| l.description = "ö".repeat(501));
    assert_eq!(fields(&invoice), ["lines[0].description"]);
}

#[test]
fn customer_name_rules() {
    let mut invoice = valid_invoice();
    invoice.customer_name = "X".into();
    assert_eq!(fields(&invoice), ["customerName"]);

    invoice.customer_name = "Jürgen Groß-Müller sen.".into();
    assert!(check_invoice(&invoice).is_empty());

    invoice.customer_name = "Firma Krause & Co".into();
    assert_eq!(fields(&invoice), ["customerName"]);
}

#[test]
fn all_errors_are_collected_in_one_pass() {
    let mut invoice = valid_invoice();
    invoice.invoice_number = String::new();
    invoice.date = "gestern".into();
    invoice.object = String::new();
    invoice.update_line("1", |l| {
        l.description = String::new();
        l.unit_price = dec!(0);
    });
    let found = fields(&invoice);
    assert!(found.contains(&"invoiceNumber".to_string()));
    assert!(found.contains(&"date".to_string()));
    assert!(found.contains(&"object".to_string()));
    assert!(found.contains(&"lines[0].description".to_string()));
    assert!(found.contains(&"lines[0].unitPrice".to_string()));
    assert!(found.len() >= 5);
}

#[test]
fn draft_coerces_numbers_from_strings() {
    let json = serde_json::json!({
        "invoiceNumber": "04138-25",
        "date": "15.06.2025",
        "dueDate": "25.06.2025",
        "object": "Hecke schneiden",
        "customerName": "Erika Baumgartner",
        "customerAddress": "Hauptstr. 5, 65388 Schlangenbad",
        "lines": [
            { "id": "1", "description": "Heckenschnitt", "unitPrice": "85,50", "quantity": 2.5, "unit": "Stunden" }
        ]
    });
    let draft: InvoiceDraft = serde_json::from_value(json).unwrap();
    let invoice = draft.parse().unwrap();
    assert_eq!(invoice.lines[0].unit_price, dec!(85.50));
    assert_eq!(invoice.lines[0].quantity, dec!(2.5));
    assert_eq!(invoice.lines[0].unit, Unit::Hours);
    assert_eq!(invoice.lines[0].total, dec!(213.75));
    assert_eq!(invoice.subtotal, dec!(213.75));
    assert!(check_invoice(&invoice).is_empty());
}

#[test]
fn draft_reports_every_unparseable_field() {
    let json = serde_json::json!({
        "invoiceNumber": "04138-25",
        "date": "15.06.2025",
        "dueDate": "25.06.2025",
        "lines": [
            { "id": "1", "description": "Fällung", "unitPrice": "viel", "quantity": "", "unit": "Meter" }
        ]
    });
    let draft: InvoiceDraft = serde_json::from_value(json).unwrap();
    let errors = draft.parse().unwrap_err();
    let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(
        fields,
        [
            "lines[0].unitPrice",
            "lines[0].quantity",
            "lines[0].unit"
        ]
    );
}

#[test]
fn customer_draft_checks_contact_formats() {
    let json = serde_json::json!({
        "name": "Erika Baumgartner",
        "address": "Hauptstr. 5, 65388 Schlangenbad",
        "email": "e.baumgartner@web.de",
        "phone": "+49 6129 1234"
    });
    let draft: CustomerDraft = serde_json::from_value(json).unwrap();
    assert!(draft.parse().is_ok());

    let json = serde_json::json!({
        "name": "Erika Baumgartner",
        "address": "kurz",
        "email": "keinemail",
        "phone": "ruf an"
    });
    let draft: CustomerDraft = serde_json::from_value(json).unwrap();
    let errors = draft.parse().unwrap_err();
    let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, ["address", "email", "phone"]);
}
