//! Store traits for invoices and payment attempts
//!
//! Implementations provide persistence for the two tables of the payment
//! workflow. The crate is agnostic to the underlying storage mechanism; the
//! default backend lives in [`crate::storage::in_memory`], a relational one
//! behind the `postgres` feature.

use anyhow::Result;
use async_trait::async_trait;

use crate::core::invoice::Invoice;
use crate::core::payment::{InvoicePayment, PaymentTransition};

/// Persistence for [`Invoice`] records
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Insert a new invoice
    ///
    /// Returns `false` when the id is already taken (unique-key semantics),
    /// `Err` only on backend failure.
    async fn insert(&self, invoice: Invoice) -> Result<bool>;

    /// Fetch an invoice by id
    async fn get(&self, id: &str) -> Result<Option<Invoice>>;

    /// List all invoices owned by `owner_id` (store-defined order)
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Invoice>>;

    /// Transition an invoice to `Paid`
    ///
    /// Idempotent: returns `true` when the row was transitioned by this call,
    /// `false` when it was already paid or absent.
    async fn mark_paid(&self, id: &str) -> Result<bool>;
}

/// Persistence for [`InvoicePayment`] records
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Insert a new pending payment attempt
    async fn insert(&self, payment: InvoicePayment) -> Result<()>;

    /// Fetch a payment attempt by its gateway transaction reference
    async fn get_by_tx_ref(&self, tx_ref: &str) -> Result<Option<InvoicePayment>>;

    /// Transition a payment attempt to `Success`
    ///
    /// Returns the updated row together with its previous status, or `None`
    /// when no row matches `tx_ref`. Applying the transition twice is a safe
    /// no-op; the second call reports `previous == Success`.
    async fn mark_success(&self, tx_ref: &str) -> Result<Option<PaymentTransition>>;
}
