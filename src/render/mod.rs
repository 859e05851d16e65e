//! Invoice document rendering.
//!
//! The renderer receives a fully validated invoice snapshot and the
//! sender's letterhead data and produces a finished document. The
//! concrete PDF backend sits behind the `pdf` feature; the trait and
//! the filename convention are always available.

use thiserror::Error;

use crate::core::types::{InvoiceData, SenderProfile};

#[cfg(feature = "pdf")]
mod pdf;

#[cfg(feature = "pdf")]
pub use pdf::PdfRenderer;

/// A rendered document ready to hand to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPdf {
    /// Download filename, `Rechnung-<nummer>.pdf`.
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Failure during document production.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum RenderError {
    /// The invoice is not in a renderable state.
    #[error("Rechnung ist nicht druckbereit: {0}")]
    NotReady(String),
    /// The PDF backend failed to assemble the document.
    #[error("PDF konnte nicht erstellt werden: {0}")]
    Assembly(String),
}

/// Produces the final invoice document.
pub trait InvoiceRenderer: Send + Sync {
    fn render(
        &self,
        invoice: &InvoiceData,
        sender: &SenderProfile,
    ) -> Result<RenderedPdf, RenderError>;
}

/// Download filename for an invoice number. Characters outside the
/// invoice-number alphabet are replaced with dashes so the name is safe
/// on every filesystem.
pub fn pdf_filename(invoice_number: &str) -> String {
    let sanitized: String = invoice_number
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect();
    format!("Rechnung-{sanitized}.pdf")
}
