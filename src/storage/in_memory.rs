//! In-memory store implementations for testing and development
//!
//! Uses RwLock for thread-safe access. Transitions take the write lock for
//! the whole read-modify-write, which gives the same lost-update protection a
//! relational backend gets from row-level updates.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::core::invoice::{Invoice, InvoiceStatus};
use crate::core::payment::{InvoicePayment, PaymentStatus, PaymentTransition};
use crate::core::store::{InvoiceStore, PaymentStore};

/// In-memory invoice store
#[derive(Clone, Default)]
pub struct InMemoryInvoiceStore {
    invoices: Arc<RwLock<HashMap<String, Invoice>>>,
}

impl InMemoryInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InvoiceStore for InMemoryInvoiceStore {
    async fn insert(&self, invoice: Invoice) -> Result<bool> {
        let mut invoices = self
            .invoices
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        if invoices.contains_key(&invoice.id) {
            return Ok(false);
        }
        invoices.insert(invoice.id.clone(), invoice);
        Ok(true)
    }

    async fn get(&self, id: &str) -> Result<Option<Invoice>> {
        let invoices = self
            .invoices
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(invoices.get(id).cloned())
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Invoice>> {
        let invoices = self
            .invoices
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(invoices
            .values()
            .filter(|inv| inv.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn mark_paid(&self, id: &str) -> Result<bool> {
        let mut invoices = self
            .invoices
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let Some(invoice) = invoices.get_mut(id) else {
            return Ok(false);
        };
        if invoice.status == InvoiceStatus::Paid {
            return Ok(false);
        }
        invoice.status = InvoiceStatus::Paid;
        invoice.updated_at = Utc::now();
        Ok(true)
    }
}

/// In-memory payment store, keyed by transaction reference
#[derive(Clone, Default)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<HashMap<String, InvoicePayment>>>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn insert(&self, payment: InvoicePayment) -> Result<()> {
        let mut payments = self
            .payments
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        if payments.contains_key(&payment.tx_ref) {
            // References come from the gateway and are never reused.
            return Err(anyhow!("duplicate transaction reference: {}", payment.tx_ref));
        }
        payments.insert(payment.tx_ref.clone(), payment);
        Ok(())
    }

    async fn get_by_tx_ref(&self, tx_ref: &str) -> Result<Option<InvoicePayment>> {
        let payments = self
            .payments
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(payments.get(tx_ref).cloned())
    }

    async fn mark_success(&self, tx_ref: &str) -> Result<Option<PaymentTransition>> {
        let mut payments = self
            .payments
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let Some(payment) = payments.get_mut(tx_ref) else {
            return Ok(None);
        };
        let previous = payment.status;
        if previous == PaymentStatus::Pending {
            payment.status = PaymentStatus::Success;
            payment.updated_at = Utc::now();
        }
        Ok(Some(PaymentTransition {
            payment: payment.clone(),
            previous,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoice(id: &str, owner: &str) -> Invoice {
        Invoice::new(
            id.to_string(),
            owner.to_string(),
            format!("invoice {}", id),
            r#"{"items": []}"#.to_string(),
        )
    }

    fn payment(tx_ref: &str, invoice_id: &str) -> InvoicePayment {
        InvoicePayment::new(
            tx_ref.to_string(),
            invoice_id.to_string(),
            "payer@example.com".to_string(),
            50000,
        )
    }

    #[tokio::test]
    async fn test_insert_and_get_invoice() {
        let store = InMemoryInvoiceStore::new();
        assert!(store.insert(invoice("1", "user-a")).await.unwrap());

        let found = store.get("1").await.unwrap().unwrap();
        assert_eq!(found.owner_id, "user-a");
        assert_eq!(found.status, InvoiceStatus::Pending);
        assert!(store.get("2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_duplicate_invoice_id_reports_taken() {
        let store = InMemoryInvoiceStore::new();
        assert!(store.insert(invoice("1", "user-a")).await.unwrap());
        assert!(!store.insert(invoice("1", "user-b")).await.unwrap());

        // Original row untouched
        let found = store.get("1").await.unwrap().unwrap();
        assert_eq!(found.owner_id, "user-a");
    }

    #[tokio::test]
    async fn test_list_by_owner_filters() {
        let store = InMemoryInvoiceStore::new();
        store.insert(invoice("a-1", "user-a")).await.unwrap();
        store.insert(invoice("a-2", "user-a")).await.unwrap();
        store.insert(invoice("b-1", "user-b")).await.unwrap();

        let mine = store.list_by_owner("user-a").await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|inv| inv.owner_id == "user-a"));
    }

    #[tokio::test]
    async fn test_mark_paid_is_idempotent_and_monotonic() {
        let store = InMemoryInvoiceStore::new();
        store.insert(invoice("1", "user-a")).await.unwrap();

        assert!(store.mark_paid("1").await.unwrap());
        assert!(!store.mark_paid("1").await.unwrap());
        assert!(!store.mark_paid("missing").await.unwrap());

        let found = store.get("1").await.unwrap().unwrap();
        assert_eq!(found.status, InvoiceStatus::Paid);
    }

    #[tokio::test]
    async fn test_payment_insert_rejects_reused_reference() {
        let store = InMemoryPaymentStore::new();
        store.insert(payment("TX-1", "1")).await.unwrap();
        assert!(store.insert(payment("TX-1", "2")).await.is_err());
    }

    #[tokio::test]
    async fn test_mark_success_reports_previous_status() {
        let store = InMemoryPaymentStore::new();
        store.insert(payment("TX-1", "1")).await.unwrap();

        let first = store.mark_success("TX-1").await.unwrap().unwrap();
        assert_eq!(first.previous, PaymentStatus::Pending);
        assert_eq!(first.payment.status, PaymentStatus::Success);

        let second = store.mark_success("TX-1").await.unwrap().unwrap();
        assert_eq!(second.previous, PaymentStatus::Success);

        assert!(store.mark_success("TX-missing").await.unwrap().is_none());
    }
}
