//! In-process store used by tests and examples.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use crate::core::dates::parse_german_date;
use crate::core::types::{Customer, InvoiceData};

use super::{CustomerStore, InvoiceFilter, InvoiceStore, StoreError, UserId};

/// Keeps every document in a `Mutex`-guarded map. The lock is only held
/// for the duration of a map operation, never across an await point.
#[derive(Debug, Default)]
pub struct MemoryStore {
    invoices: Mutex<HashMap<String, (UserId, InvoiceData)>>,
    customers: Mutex<HashMap<String, (UserId, Customer)>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh_id(&self, prefix: &str) -> String {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{prefix}-{n}")
    }

    fn lock<'a, T>(mutex: &'a Mutex<T>) -> Result<std::sync::MutexGuard<'a, T>, StoreError> {
        mutex
            .lock()
            .map_err(|_| StoreError::Unavailable("Speicher ist beschädigt".into()))
    }
}

#[async_trait]
impl InvoiceStore for MemoryStore {
    async fn insert(&self, user: &UserId, invoice: &InvoiceData) -> Result<String, StoreError> {
        let id = self.fresh_id("inv");
        let mut stored = invoice.clone();
        stored.id = Some(id.clone());
        Self::lock(&self.invoices)?.insert(id.clone(), (user.clone(), stored));
        Ok(id)
    }

    async fn update(
        &self,
        user: &UserId,
        id: &str,
        invoice: &InvoiceData,
    ) -> Result<(), StoreError> {
        let mut invoices = Self::lock(&self.invoices)?;
        let Some((owner, slot)) = invoices.get_mut(id) else {
            return Err(StoreError::NotFound(id.into()));
        };
        if owner != user {
            return Err(StoreError::PermissionDenied);
        }
        let mut stored = invoice.clone();
        stored.id = Some(id.to_string());
        *slot = stored;
        Ok(())
    }

    async fn get(&self, user: &UserId, id: &str) -> Result<InvoiceData, StoreError> {
        let invoices = Self::lock(&self.invoices)?;
        let Some((owner, invoice)) = invoices.get(id) else {
            return Err(StoreError::NotFound(id.into()));
        };
        if owner != user {
            return Err(StoreError::PermissionDenied);
        }
        Ok(invoice.clone())
    }

    async fn find_by_number(
        &self,
        user: &UserId,
        number: &str,
    ) -> Result<Vec<InvoiceData>, StoreError> {
        let invoices = Self::lock(&self.invoices)?;
        Ok(invoices
            .values()
            .filter(|(owner, inv)| owner == user && inv.invoice_number == number)
            .map(|(_, inv)| inv.clone())
            .collect())
    }

    async fn list(
        &self,
        user: &UserId,
        filter: &InvoiceFilter,
    ) -> Result<Vec<InvoiceData>, StoreError> {
        let invoices = Self::lock(&self.invoices)?;
        let mut result: Vec<InvoiceData> = invoices
            .values()
            .filter(|(owner, inv)| owner == user && filter.matches(inv))
            .map(|(_, inv)| inv.clone())
            .collect();
        result.sort_by(|a, b| {
            let da = parse_german_date(&a.date);
            let db = parse_german_date(&b.date);
            db.cmp(&da).then_with(|| b.invoice_number.cmp(&a.invoice_number))
        });
        Ok(result)
    }
}

#[async_trait]
impl CustomerStore for MemoryStore {
    async fn insert(&self, user: &UserId, customer: &Customer) -> Result<String, StoreError> {
        let id = self.fresh_id("cust");
        let mut stored = customer.clone();
        stored.id = Some(id.clone());
        Self::lock(&self.customers)?.insert(id.clone(), (user.clone(), stored));
        Ok(id)
    }

    async fn update(
        &self,
        user: &UserId,
        id: &str,
        customer: &Customer,
    ) -> Result<(), StoreError> {
        let mut customers = Self::lock(&self.customers)?;
        let Some((owner, slot)) = customers.get_mut(id) else {
            return Err(StoreError::NotFound(id.into()));
        };
        if owner != user {
            return Err(StoreError::PermissionDenied);
        }
        let mut stored = customer.clone();
        stored.id = Some(id.to_string());
        *slot = stored;
        Ok(())
    }

    async fn delete(&self, user: &UserId, id: &str) -> Result<(), StoreError> {
        let mut customers = Self::lock(&self.customers)?;
        let Some((owner, _)) = customers.get(id) else {
            return Err(StoreError::NotFound(id.into()));
        };
        if owner != user {
            return Err(StoreError::PermissionDenied);
        }
        customers.remove(id);
        Ok(())
    }

    async fn get(&self, user: &UserId, id: &str) -> Result<Customer, StoreError> {
        let customers = Self::lock(&self.customers)?;
        let Some((owner, customer)) = customers.get(id) else {
            return Err(StoreError::NotFound(id.into()));
        };
        if owner != user {
            return Err(StoreError::PermissionDenied);
        }
        Ok(customer.clone())
    }

    async fn list(
        &self,
        user: &UserId,
        search: Option<&str>,
    ) -> Result<Vec<Customer>, StoreError> {
        let customers = Self::lock(&self.customers)?;
        let needle = search.map(str::to_lowercase);
        let mut result: Vec<Customer> = customers
            .values()
            .filter(|(owner, c)| {
                owner == user
                    && needle
                        .as_deref()
                        .is_none_or(|n| c.name.to_lowercase().contains(n))
            })
            .map(|(_, c)| c.clone())
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }
}
