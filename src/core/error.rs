use thiserror::Error;

use crate::store::StoreError;

/// Top-level error for invoice operations.
///
/// Merely-invalid user input is not an error: validation returns a
/// [`crate::validation::ValidationReport`] instead. These variants
/// cover infrastructure and state failures.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InvoiceError {
    /// Invalid input reached an operation that requires valid data.
    #[error("Validierung fehlgeschlagen: {0}")]
    Validation(String),

    /// No authenticated user for an operation that requires one.
    #[error("Keine Anmeldung vorhanden")]
    Auth,

    /// The backing store failed.
    #[error("Speicherfehler: {0}")]
    Store(#[from] StoreError),

    /// PDF assembly failed.
    #[error("PDF-Erstellung fehlgeschlagen: {0}")]
    Render(#[from] crate::render::RenderError),

    /// A status transition outside draft → finalized → paid.
    #[error("Statuswechsel {from} → {to} ist nicht erlaubt")]
    Status {
        from: crate::core::InvoiceStatus,
        to: crate::core::InvoiceStatus,
    },

    /// Invalid invoice number sequence operation.
    #[error("Nummernkreis: {0}")]
    Numbering(String),
}
