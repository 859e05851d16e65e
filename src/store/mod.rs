//! Entity stores behind async traits.
//!
//! Every operation is scoped by an opaque [`UserId`]; one user can
//! never see or touch another user's documents. The traits keep the
//! actual document database out of this crate; [`MemoryStore`] is the
//! in-process implementation used by tests and examples.

mod memory;

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::core::dates::parse_german_date;
use crate::core::types::{Customer, InvoiceData, InvoiceStatus};

pub use memory::MemoryStore;

/// Opaque owner identifier for stored documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Failure of the backing store.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// The store could not be reached or answered abnormally.
    #[error("Datenbank nicht erreichbar: {0}")]
    Unavailable(String),
    /// No document with the given id exists for this user.
    #[error("Dokument {0} nicht gefunden")]
    NotFound(String),
    /// The document exists but belongs to another user.
    #[error("Kein Zugriff auf dieses Dokument")]
    PermissionDenied,
}

/// Filter for invoice listings; all criteria are conjunctive.
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    pub status: Option<InvoiceStatus>,
    /// Case-insensitive substring of the customer name.
    pub customer_name: Option<String>,
    /// Case-insensitive substring of the invoice number.
    pub invoice_number: Option<String>,
    /// Inclusive issue-date bounds, `dd.MM.yyyy`.
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl InvoiceFilter {
    /// Whether the invoice satisfies every set criterion. Date bounds
    /// compare parsed calendar dates; an invoice whose date does not
    /// parse never matches a date-bounded filter.
    pub fn matches(&self, invoice: &InvoiceData) -> bool {
        if let Some(status) = self.status
            && invoice.status != status
        {
            return false;
        }
        if let Some(name) = &self.customer_name
            && !invoice
                .customer_name
                .to_lowercase()
                .contains(&name.to_lowercase())
        {
            return false;
        }
        if let Some(number) = &self.invoice_number
            && !invoice
                .invoice_number
                .to_lowercase()
                .contains(&number.to_lowercase())
        {
            return false;
        }
        if self.date_from.is_some() || self.date_to.is_some() {
            let Some(date) = parse_german_date(&invoice.date) else {
                return false;
            };
            if let Some(from) = self.date_from.as_deref().and_then(parse_german_date)
                && date < from
            {
                return false;
            }
            if let Some(to) = self.date_to.as_deref().and_then(parse_german_date)
                && date > to
            {
                return false;
            }
        }
        true
    }
}

/// Aggregate counts and revenue over one user's invoices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceStats {
    pub total: usize,
    pub draft: usize,
    pub finalized: usize,
    pub paid: usize,
    /// Sum of gross totals of finalized and paid invoices.
    pub total_revenue: Decimal,
}

impl InvoiceStats {
    /// Compute stats over a set of invoices. Drafts do not count as
    /// revenue.
    pub fn over<'a>(invoices: impl IntoIterator<Item = &'a InvoiceData>) -> Self {
        let mut stats = Self::default();
        for invoice in invoices {
            stats.total += 1;
            match invoice.status {
                InvoiceStatus::Draft => stats.draft += 1,
                InvoiceStatus::Finalized => {
                    stats.finalized += 1;
                    stats.total_revenue += invoice.total_amount;
                }
                InvoiceStatus::Paid => {
                    stats.paid += 1;
                    stats.total_revenue += invoice.total_amount;
                }
            }
        }
        stats
    }
}

/// Persistent home of invoice documents. There is deliberately no
/// delete operation; issued invoices stay on record.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Store a new invoice and return its generated id.
    async fn insert(&self, user: &UserId, invoice: &InvoiceData) -> Result<String, StoreError>;

    /// Replace the invoice with the given id.
    async fn update(&self, user: &UserId, id: &str, invoice: &InvoiceData)
    -> Result<(), StoreError>;

    async fn get(&self, user: &UserId, id: &str) -> Result<InvoiceData, StoreError>;

    /// All invoices of this user carrying exactly this invoice number.
    async fn find_by_number(
        &self,
        user: &UserId,
        number: &str,
    ) -> Result<Vec<InvoiceData>, StoreError>;

    /// Filtered listing, newest issue date first.
    async fn list(&self, user: &UserId, filter: &InvoiceFilter)
    -> Result<Vec<InvoiceData>, StoreError>;

    /// Aggregate stats over all of the user's invoices.
    async fn stats(&self, user: &UserId) -> Result<InvoiceStats, StoreError> {
        let invoices = self.list(user, &InvoiceFilter::default()).await?;
        Ok(InvoiceStats::over(&invoices))
    }
}

/// Persistent home of customer records.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn insert(&self, user: &UserId, customer: &Customer) -> Result<String, StoreError>;

    async fn update(&self, user: &UserId, id: &str, customer: &Customer)
    -> Result<(), StoreError>;

    async fn delete(&self, user: &UserId, id: &str) -> Result<(), StoreError>;

    async fn get(&self, user: &UserId, id: &str) -> Result<Customer, StoreError>;

    /// All customers of the user, optionally filtered by a
    /// case-insensitive name substring, sorted by name.
    async fn list(&self, user: &UserId, search: Option<&str>)
    -> Result<Vec<Customer>, StoreError>;
}
