//! Layered invoice validation.
//!
//! Three layers, combined by [`service::InvoiceValidator`]:
//!
//! - [`schema`] checks field formats and ranges, pure and offline.
//! - [`placeholder`] screens for obvious dummy data.
//! - [`rules`] applies business plausibility rules, including the
//!   store-backed invoice number uniqueness check.
//!
//! Invalid input is never an `Err`; every layer reports findings as
//! field/message pairs so the caller can show all of them at once.

pub mod placeholder;
pub mod rules;
pub mod schema;
pub mod service;

use std::collections::BTreeMap;

pub use service::InvoiceValidator;

/// One finding against one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Field path, e.g. `invoiceNumber` or `lines[2].unitPrice`.
    pub field: String,
    /// Human-readable German message.
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Aggregated outcome of a validation pass.
///
/// `errors` block the operation; `warnings` do not. At most one message
/// is kept per field, the first one reported, so a field with several
/// problems surfaces them one at a time as the user fixes them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: BTreeMap<String, String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record an error unless the field already has one.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn extend(&mut self, errors: impl IntoIterator<Item = ValidationError>) {
        for e in errors {
            self.add(e.field, e.message);
        }
    }

    /// The field that should receive focus, in a fixed order: header
    /// fields first, then the first erroring line, then anything else
    /// alphabetically.
    pub fn first_error_field(&self) -> Option<&str> {
        const FOCUS_ORDER: [&str; 4] = ["invoiceNumber", "object", "customerName", "customerAddress"];
        for field in FOCUS_ORDER {
            if self.errors.contains_key(field) {
                return Some(field);
            }
        }
        if let Some(field) = self
            .errors
            .keys()
            .find(|k| k.starts_with("line") || k.starts_with("customer"))
        {
            return Some(field);
        }
        self.errors.keys().next().map(String::as_str)
    }
}
