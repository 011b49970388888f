//! Payment attempt records
//!
//! Each call to `initiate_payment` writes one `InvoicePayment` row keyed by
//! the gateway-assigned transaction reference. The reference is the join key
//! between local state and inbound webhook events; it is never reused across
//! attempts. Many attempts may exist per invoice, but only one should ever
//! reach `Success`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a payment attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Success,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Success => "SUCCESS",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(PaymentStatus::Pending),
            "SUCCESS" => Some(PaymentStatus::Success),
            _ => None,
        }
    }
}

/// A persisted payment attempt against an invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoicePayment {
    /// Internal row identity
    pub id: Uuid,

    /// Gateway transaction reference, unique, assigned at initiation time
    pub tx_ref: String,

    /// The invoice this attempt pays for
    pub invoice_id: String,

    /// Payer email as submitted to the gateway
    pub email: String,

    /// Charge amount in minor currency units, recomputed server-side
    pub amount: i64,

    pub status: PaymentStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InvoicePayment {
    /// Create a new pending payment attempt
    pub fn new(tx_ref: String, invoice_id: String, email: String, amount: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tx_ref,
            invoice_id,
            email,
            amount,
            status: PaymentStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Result of marking a payment successful
///
/// `previous` makes webhook re-delivery detection explicit: a redelivered
/// event sees `previous == Success` and can short-circuit.
#[derive(Debug, Clone)]
pub struct PaymentTransition {
    /// The payment row after the transition
    pub payment: InvoicePayment,

    /// Status the row held before this transition was applied
    pub previous: PaymentStatus,
}
