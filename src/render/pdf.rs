//! PDF backend built on `lopdf`.
//!
//! Produces a paginated A4 invoice: letterhead, customer block, line
//! table, totals and the bank footer. Text is encoded WinAnsi, which
//! covers the German umlauts and the euro sign.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};
use rust_decimal::Decimal;

use crate::core::dates::parse_german_date;
use crate::core::round_half_up;
use crate::core::types::{InvoiceData, SenderProfile, ServiceLine};

use super::{InvoiceRenderer, RenderError, RenderedPdf, pdf_filename};

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN_LEFT: i64 = 56;
const MARGIN_RIGHT: i64 = 539;
const FIRST_LINE_Y: i64 = 786;
const FOOTER_LIMIT_Y: i64 = 120;

/// Renders invoices as A4 PDF documents.
#[derive(Debug, Clone, Default)]
pub struct PdfRenderer;

impl PdfRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl InvoiceRenderer for PdfRenderer {
    fn render(
        &self,
        invoice: &InvoiceData,
        sender: &SenderProfile,
    ) -> Result<RenderedPdf, RenderError> {
        if invoice.lines.is_empty() {
            return Err(RenderError::NotReady(
                "Rechnung hat keine Leistungspositionen".into(),
            ));
        }
        if parse_german_date(&invoice.date).is_none() {
            return Err(RenderError::NotReady("Rechnungsdatum ist ungültig".into()));
        }

        let bytes = assemble(invoice, sender)?;
        Ok(RenderedPdf {
            filename: pdf_filename(&invoice.invoice_number),
            bytes,
        })
    }
}

fn assemble(invoice: &InvoiceData, sender: &SenderProfile) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let font_bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => Object::Reference(font_regular),
            "F2" => Object::Reference(font_bold),
        },
    });

    let mut writer = PageWriter::new();
    compose(&mut writer, invoice, sender);

    let mut page_ids = Vec::with_capacity(writer.pages.len());
    for operations in writer.pages {
        let content = Content { operations };
        let encoded = content
            .encode()
            .map_err(|e| RenderError::Assembly(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "Contents" => Object::Reference(content_id),
        });
        page_ids.push(page_id);
    }

    let kids: Vec<Object> = page_ids.iter().map(|id| Object::Reference(*id)).collect();
    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => Object::Reference(resources_id),
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut output = Vec::new();
    doc.save_to(&mut output)
        .map_err(|e| RenderError::Assembly(e.to_string()))?;
    Ok(output)
}

/// Accumulates text operations page by page, breaking to a new page
/// when the cursor reaches the footer area.
struct PageWriter {
    pages: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    y: i64,
}

impl PageWriter {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Vec::new(),
            y: FIRST_LINE_Y,
        }
    }

    fn text(&mut self, x: i64, font: &str, size: i64, value: &str) {
        self.current.push(Operation::new("BT", vec![]));
        self.current
            .push(Operation::new("Tf", vec![font.into(), size.into()]));
        self.current
            .push(Operation::new("Td", vec![x.into(), self.y.into()]));
        self.current.push(Operation::new(
            "Tj",
            vec![Object::String(win_ansi(value), StringFormat::Literal)],
        ));
        self.current.push(Operation::new("ET", vec![]));
    }

    fn text_right(&mut self, right_edge: i64, font: &str, size: i64, value: &str) {
        // Helvetica has no fixed advance; half the point size per
        // character is close enough for the numeric columns.
        let width = (value.chars().count() as i64 * size) / 2;
        self.text(right_edge - width, font, size, value);
    }

    fn rule(&mut self) {
        self.current.push(Operation::new(
            "m",
            vec![MARGIN_LEFT.into(), self.y.into()],
        ));
        self.current.push(Operation::new(
            "l",
            vec![MARGIN_RIGHT.into(), self.y.into()],
        ));
        self.current.push(Operation::new("S", vec![]));
    }

    fn advance(&mut self, step: i64) {
        self.y -= step;
        if self.y < FOOTER_LIMIT_Y {
            self.break_page();
        }
    }

    fn break_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.y = FIRST_LINE_Y;
    }

    fn finish(&mut self) {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.pages.push(std::mem::take(&mut self.current));
        }
    }
}

fn compose(w: &mut PageWriter, invoice: &InvoiceData, sender: &SenderProfile) {
    // Letterhead
    w.text(MARGIN_LEFT, "F2", 16, &sender.company_name);
    w.advance(14);
    for tagline in &sender.taglines {
        w.text(MARGIN_LEFT, "F1", 9, tagline);
        w.advance(11);
    }
    w.advance(10);
    w.text(
        MARGIN_LEFT,
        "F1",
        7,
        &format!(
            "{} · {} · {} · {}",
            sender.owner, sender.street, sender.city, sender.phone
        ),
    );
    w.advance(6);
    w.rule();
    w.advance(24);

    // Customer block
    w.text(MARGIN_LEFT, "F1", 10, &invoice.customer_name);
    w.advance(12);
    for part in invoice.customer_address.split(',') {
        w.text(MARGIN_LEFT, "F1", 10, part.trim());
        w.advance(12);
    }
    w.advance(18);

    // Title and metadata
    w.text(
        MARGIN_LEFT,
        "F2",
        13,
        &format!("Rechnung Nr. {}", invoice.invoice_number),
    );
    w.text_right(MARGIN_RIGHT, "F1", 10, &format!("Datum: {}", invoice.date));
    w.advance(14);
    w.text_right(
        MARGIN_RIGHT,
        "F1",
        10,
        &format!("Fällig am: {}", invoice.due_date),
    );
    w.advance(16);
    w.text(MARGIN_LEFT, "F1", 10, &format!("Objekt: {}", invoice.object));
    w.advance(22);

    // Table header
    w.text(MARGIN_LEFT, "F2", 9, "Pos.");
    w.text(MARGIN_LEFT + 30, "F2", 9, "Beschreibung");
    w.text(330, "F2", 9, "Menge");
    w.text(385, "F2", 9, "Einheit");
    w.text(440, "F2", 9, "Einzelpreis");
    w.text_right(MARGIN_RIGHT, "F2", 9, "Gesamt");
    w.advance(5);
    w.rule();
    w.advance(14);

    for (i, line) in invoice.lines.iter().enumerate() {
        compose_line(w, i + 1, line);
    }

    w.advance(6);
    w.rule();
    w.advance(16);

    // Totals block
    w.text(330, "F1", 10, "Zwischensumme:");
    w.text_right(MARGIN_RIGHT, "F1", 10, &format_eur(invoice.subtotal));
    w.advance(13);
    w.text(330, "F1", 10, "MwSt. 19 %:");
    w.text_right(MARGIN_RIGHT, "F1", 10, &format_eur(invoice.vat_amount));
    w.advance(13);
    w.text(330, "F2", 11, "Gesamtbetrag:");
    w.text_right(MARGIN_RIGHT, "F2", 11, &format_eur(invoice.total_amount));
    w.advance(26);

    w.text(
        MARGIN_LEFT,
        "F1",
        9,
        &format!(
            "Bitte überweisen Sie den Betrag bis zum {} auf das unten genannte Konto.",
            invoice.due_date
        ),
    );
    w.advance(24);

    // Bank footer
    w.rule();
    w.advance(12);
    w.text(
        MARGIN_LEFT,
        "F1",
        8,
        &format!(
            "{} · IBAN {} · BIC {} · {}",
            sender.bank.account_holder, sender.bank.iban, sender.bank.bic, sender.bank.bank_name
        ),
    );
    if let Some(tax_number) = &sender.tax_number {
        w.advance(10);
        w.text(MARGIN_LEFT, "F1", 8, &format!("Steuernummer: {tax_number}"));
    }

    w.finish();
}

fn compose_line(w: &mut PageWriter, position: usize, line: &ServiceLine) {
    w.text(MARGIN_LEFT, "F1", 9, &position.to_string());
    // Long descriptions wrap at ~52 characters per row.
    let mut rows = wrap(&line.description, 52).into_iter();
    if let Some(first) = rows.next() {
        w.text(MARGIN_LEFT + 30, "F1", 9, &first);
    }
    w.text(330, "F1", 9, &format_quantity(line.quantity));
    w.text(385, "F1", 9, line.unit.code());
    w.text(440, "F1", 9, &format_eur(line.unit_price));
    w.text_right(MARGIN_RIGHT, "F1", 9, &format_eur(line.total));
    w.advance(12);
    for row in rows {
        w.text(MARGIN_LEFT + 30, "F1", 9, &row);
        w.advance(12);
    }
    w.advance(2);
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut rows = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            rows.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() || rows.is_empty() {
        rows.push(current);
    }
    rows
}

/// German amount formatting: `1.234,56 €`.
fn format_eur(amount: Decimal) -> String {
    let rounded = round_half_up(amount, 2);
    let plain = format!("{rounded:.2}");
    let (integer, fraction) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));
    let (sign, digits) = integer
        .strip_prefix('-')
        .map_or(("", integer), |rest| ("-", rest));
    let mut grouped = String::new();
    let chars: Vec<char> = digits.chars().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*c);
    }
    format!("{sign}{grouped},{fraction} €")
}

fn format_quantity(quantity: Decimal) -> String {
    let normalized = quantity.normalize();
    normalized.to_string().replace('.', ",")
}

/// Encode text as WinAnsi (CP-1252). Unmappable characters become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '€' => 0x80,
            '\u{0000}'..='\u{00FF}' => c as u8,
            _ => b'?',
        })
        .collect()
}
