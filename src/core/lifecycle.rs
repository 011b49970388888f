//! Invoice lifecycle manager
//!
//! The state machine at the heart of the service: creates invoices, computes
//! totals, initiates gateway transactions, and applies the status transitions
//! reported by verified webhook events.
//!
//! All collaborators are injected at construction and shared per process.
//! One invariant runs through every method here: an invoice becomes `Paid`
//! only through [`InvoiceLifecycle::apply_charge_success`], which is driven
//! exclusively by the signature-verified webhook handler.

use std::sync::Arc;

use serde::Serialize;

use crate::core::error::{InvoiceError, PaylinkError, ValidationError};
use crate::core::invoice::{Invoice, InvoiceDocument, InvoiceStatus, MAX_INVOICE_ID_LEN};
use crate::core::payment::{InvoicePayment, PaymentStatus};
use crate::core::store::{InvoiceStore, PaymentStore};
use crate::gateway::{PaymentGateway, TransactionMetadata};

/// One row of an owner's invoice listing
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceSummary {
    pub id: String,
    pub name: String,
    pub status: InvoiceStatus,
}

/// What the caller needs to hand the payer over to the gateway
#[derive(Debug, Clone, Serialize)]
pub struct PaymentInit {
    pub tx_ref: String,
    pub tx_url: String,
    pub amount: i64,
}

/// Outcome of applying a verified charge-success event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Payment and invoice transitioned by this delivery
    Applied,

    /// Event was already applied earlier; this delivery was a no-op
    AlreadyApplied,

    /// No payment row matches the reference; acknowledged and dropped
    UnknownReference,
}

/// Core state machine for the invoice-payment workflow
pub struct InvoiceLifecycle {
    invoices: Arc<dyn InvoiceStore>,
    payments: Arc<dyn PaymentStore>,
    gateway: Arc<dyn PaymentGateway>,
}

impl InvoiceLifecycle {
    pub fn new(
        invoices: Arc<dyn InvoiceStore>,
        payments: Arc<dyn PaymentStore>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            invoices,
            payments,
            gateway,
        }
    }

    /// Create a new pending invoice owned by `owner_id`
    ///
    /// The document is parsed once here so a payload that can never yield a
    /// chargeable total is rejected at the door rather than at payment time.
    pub async fn create_invoice(
        &self,
        owner_id: &str,
        id: &str,
        name: &str,
        document: &str,
    ) -> Result<String, PaylinkError> {
        if id.is_empty() || id.len() > MAX_INVOICE_ID_LEN {
            return Err(ValidationError::Invalid(format!(
                "invoice id must be 1-{} characters",
                MAX_INVOICE_ID_LEN
            ))
            .into());
        }
        InvoiceDocument::parse(document)?;

        let invoice = Invoice::new(
            id.to_string(),
            owner_id.to_string(),
            name.to_string(),
            document.to_string(),
        );
        let inserted = self
            .invoices
            .insert(invoice)
            .await
            .map_err(PaylinkError::storage)?;
        if !inserted {
            return Err(InvoiceError::AlreadyExists { id: id.to_string() }.into());
        }

        tracing::info!(invoice_id = %id, owner_id = %owner_id, "invoice created");
        Ok(id.to_string())
    }

    /// List invoices owned by the caller
    pub async fn list_invoices(&self, owner_id: &str) -> Result<Vec<InvoiceSummary>, PaylinkError> {
        let invoices = self
            .invoices
            .list_by_owner(owner_id)
            .await
            .map_err(PaylinkError::storage)?;
        Ok(invoices
            .into_iter()
            .map(|inv| InvoiceSummary {
                id: inv.id,
                name: inv.name,
                status: inv.status,
            })
            .collect())
    }

    /// Fetch an invoice by id; public read, no ownership check
    pub async fn get_invoice(&self, id: &str) -> Result<Invoice, PaylinkError> {
        self.invoices
            .get(id)
            .await
            .map_err(PaylinkError::storage)?
            .ok_or_else(|| InvoiceError::NotFound { id: id.to_string() }.into())
    }

    /// Initiate a payment attempt for an invoice
    ///
    /// The charge amount is recomputed from the stored document; a
    /// client-supplied amount is never accepted. An invoice that is already
    /// paid is rejected before any gateway traffic happens.
    ///
    /// Two concurrent initiations may both read a pending snapshot and write
    /// two pending rows; that is tolerated, since only a matching verified
    /// webhook can ever mark one of them successful and the invoice
    /// transition itself is idempotent.
    pub async fn initiate_payment(
        &self,
        invoice_id: &str,
        email: &str,
        _payer_name: &str,
    ) -> Result<PaymentInit, PaylinkError> {
        let invoice = self.get_invoice(invoice_id).await?;
        if invoice.status == InvoiceStatus::Paid {
            return Err(InvoiceError::AlreadyPaid {
                id: invoice_id.to_string(),
            }
            .into());
        }

        let document =
            InvoiceDocument::parse(&invoice.document).map_err(|e| {
                // The document was validated at creation; failing here means
                // the stored payload was corrupted out-of-band.
                PaylinkError::Internal(format!("stored document unreadable: {}", e))
            })?;
        let amount = document.amount_subunits()?;

        let tx = self
            .gateway
            .initialize_transaction(
                amount,
                email,
                TransactionMetadata {
                    invoice_id: invoice_id.to_string(),
                },
            )
            .await?;

        let payment = InvoicePayment::new(
            tx.reference.clone(),
            invoice_id.to_string(),
            email.to_string(),
            amount,
        );
        self.payments
            .insert(payment)
            .await
            .map_err(PaylinkError::storage)?;

        tracing::info!(
            invoice_id = %invoice_id,
            tx_ref = %tx.reference,
            amount,
            "payment initiated"
        );
        Ok(PaymentInit {
            tx_ref: tx.reference,
            tx_url: tx.authorization_url,
            amount,
        })
    }

    /// Apply a verified charge-success event
    ///
    /// The payment row is transitioned first so a redelivered event is
    /// detected as already-successful; the invoice transition follows and is
    /// attempted even on redelivery, covering a partial failure between the
    /// two writes. The invoice to pay comes from the local payment row, not
    /// from the webhook payload; `reported_invoice_id` and `reported_amount`
    /// are only cross-checked for alerting.
    pub async fn apply_charge_success(
        &self,
        tx_ref: &str,
        reported_invoice_id: Option<&str>,
        reported_amount: Option<i64>,
    ) -> Result<WebhookOutcome, PaylinkError> {
        let Some(transition) = self
            .payments
            .mark_success(tx_ref)
            .await
            .map_err(PaylinkError::storage)?
        else {
            // Expected under at-least-once delivery of events for other
            // systems sharing the gateway account; non-fatal.
            tracing::warn!(tx_ref = %tx_ref, "charge.success for unknown transaction reference");
            return Ok(WebhookOutcome::UnknownReference);
        };
        let payment = &transition.payment;

        if let Some(reported) = reported_amount {
            if reported != payment.amount {
                tracing::warn!(
                    tx_ref = %tx_ref,
                    recorded = payment.amount,
                    reported,
                    "webhook amount differs from recorded payment amount"
                );
            }
        }
        if let Some(reported) = reported_invoice_id {
            if reported != payment.invoice_id {
                tracing::warn!(
                    tx_ref = %tx_ref,
                    recorded = %payment.invoice_id,
                    reported = %reported,
                    "webhook metadata names a different invoice than the payment row"
                );
            }
        }

        let transitioned = self
            .invoices
            .mark_paid(&payment.invoice_id)
            .await
            .map_err(PaylinkError::storage)?;

        match transition.previous {
            PaymentStatus::Pending => {
                tracing::info!(
                    tx_ref = %tx_ref,
                    invoice_id = %payment.invoice_id,
                    "payment settled, invoice paid"
                );
                Ok(WebhookOutcome::Applied)
            }
            PaymentStatus::Success => {
                if transitioned {
                    // First delivery crashed between the two writes; this
                    // redelivery completed the invoice side.
                    tracing::info!(
                        tx_ref = %tx_ref,
                        invoice_id = %payment.invoice_id,
                        "invoice transition completed on redelivery"
                    );
                } else {
                    tracing::debug!(tx_ref = %tx_ref, "duplicate charge.success ignored");
                }
                Ok(WebhookOutcome::AlreadyApplied)
            }
        }
    }
}
