//! Invoice lifecycle workflow.
//!
//! [`InvoiceWorkflow`] composes the store, the auth provider, the
//! validator and the renderer into the three user-facing operations:
//! saving a draft, finalizing it into a PDF, and marking it paid.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;

use crate::auth::AuthProvider;
use crate::core::error::InvoiceError;
use crate::core::types::{InvoiceData, InvoiceStatus, SenderProfile};
use crate::render::{InvoiceRenderer, RenderedPdf};
use crate::store::InvoiceStore;
use crate::validation::{InvoiceValidator, ValidationReport};

/// Result of a save attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Stored; the invoice now carries this id.
    Saved { id: String },
    /// Validation failed, nothing was stored.
    Rejected(ValidationReport),
    /// Another save was already running; this one was ignored.
    InFlight,
}

/// Result of a finalize attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalizeOutcome {
    /// The invoice is finalized and the document is ready.
    Finalized {
        pdf: RenderedPdf,
        warnings: Vec<String>,
    },
    /// Validation failed, the invoice stays a draft.
    Rejected(ValidationReport),
    /// Another operation was already running; this one was ignored.
    InFlight,
}

/// Drives one invoice through draft, finalized and paid.
///
/// One workflow instance guards one editing surface: a second save or
/// finalize while the first is still running is dropped, matching a
/// double-clicked button, not queued.
pub struct InvoiceWorkflow<S, A, R> {
    store: S,
    auth: A,
    renderer: R,
    sender: SenderProfile,
    busy: AtomicBool,
}

impl<S, A, R> InvoiceWorkflow<S, A, R>
where
    S: InvoiceStore,
    A: AuthProvider,
    R: InvoiceRenderer,
{
    pub fn new(store: S, auth: A, renderer: R, sender: SenderProfile) -> Self {
        Self {
            store,
            auth,
            renderer,
            sender,
            busy: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validate and persist a draft. Inserts on the first save, updates
    /// afterwards; sets `id` and the stored timestamps on the passed
    /// invoice.
    pub async fn save(
        &self,
        invoice: &mut InvoiceData,
        validator: &mut InvoiceValidator,
    ) -> Result<SaveOutcome, InvoiceError> {
        let Some(_guard) = FlightGuard::acquire(&self.busy) else {
            return Ok(SaveOutcome::InFlight);
        };
        let Some(user) = self.auth.current_user() else {
            return Err(InvoiceError::Auth);
        };

        invoice.recalculate();
        let report = validator.validate_for_save(invoice);
        if !report.is_valid() {
            return Ok(SaveOutcome::Rejected(report));
        }

        let now = Utc::now().to_rfc3339();
        invoice.updated_at = Some(now.clone());
        let id = match invoice.id.clone() {
            Some(id) => {
                self.store.update(&user, &id, invoice).await?;
                id
            }
            None => {
                invoice.created_at = Some(now);
                let id = self.store.insert(&user, invoice).await?;
                invoice.id = Some(id.clone());
                id
            }
        };
        Ok(SaveOutcome::Saved { id })
    }

    /// Validate strictly, flip the draft to finalized, persist and
    /// render the PDF.
    ///
    /// The status is flipped and persisted before the render runs; a
    /// failing render therefore leaves a finalized invoice without a
    /// document. Callers may retry the render via a second finalize,
    /// which skips the status transition for already-finalized
    /// invoices.
    pub async fn finalize(
        &self,
        invoice: &mut InvoiceData,
        validator: &mut InvoiceValidator,
    ) -> Result<FinalizeOutcome, InvoiceError> {
        let Some(_guard) = FlightGuard::acquire(&self.busy) else {
            return Ok(FinalizeOutcome::InFlight);
        };
        let Some(user) = self.auth.current_user() else {
            return Err(InvoiceError::Auth);
        };
        if invoice.status == InvoiceStatus::Paid {
            return Err(InvoiceError::Status {
                from: invoice.status,
                to: InvoiceStatus::Finalized,
            });
        }

        invoice.recalculate();
        let report = validator
            .validate_for_pdf(invoice, &self.auth, &self.store)
            .await;
        if !report.is_valid() {
            return Ok(FinalizeOutcome::Rejected(report));
        }

        if invoice.status == InvoiceStatus::Draft {
            let now = Utc::now().to_rfc3339();
            invoice.status = InvoiceStatus::Finalized;
            invoice.finalized_at = Some(now.clone());
            invoice.updated_at = Some(now);
            match invoice.id.clone() {
                Some(id) => self.store.update(&user, &id, invoice).await?,
                None => {
                    let id = self.store.insert(&user, invoice).await?;
                    invoice.id = Some(id);
                }
            }
        }

        let pdf = self.renderer.render(invoice, &self.sender)?;
        Ok(FinalizeOutcome::Finalized {
            pdf,
            warnings: report.warnings,
        })
    }

    /// Record payment of a finalized invoice.
    pub async fn mark_paid(&self, invoice: &mut InvoiceData) -> Result<(), InvoiceError> {
        let Some(user) = self.auth.current_user() else {
            return Err(InvoiceError::Auth);
        };
        if !invoice.status.can_transition(InvoiceStatus::Paid) {
            return Err(InvoiceError::Status {
                from: invoice.status,
                to: InvoiceStatus::Paid,
            });
        }
        let id = invoice
            .id
            .clone()
            .ok_or_else(|| InvoiceError::Validation("Rechnung wurde noch nie gespeichert".into()))?;

        let now = Utc::now().to_rfc3339();
        invoice.status = InvoiceStatus::Paid;
        invoice.paid_at = Some(now.clone());
        invoice.updated_at = Some(now);
        self.store.update(&user, &id, invoice).await?;
        Ok(())
    }
}

/// Clears the busy flag when the operation ends, however it ends.
struct FlightGuard<'a>(&'a AtomicBool);

impl<'a> FlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
