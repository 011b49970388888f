//! Invoice domain types and total computation
//!
//! The invoice `document` is an opaque serialized payload from the store's
//! point of view; it is parsed only at the boundary, when a payment is
//! initiated and the charge amount has to be recomputed server-side.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::core::error::InvoiceError;

/// Maximum length of a caller-chosen invoice id
pub const MAX_INVOICE_ID_LEN: usize = 32;

/// Lifecycle status of an invoice
///
/// `Paid` is terminal: it is reached only through a verified webhook and the
/// invoice never reverts to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Pending,
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "PENDING",
            InvoiceStatus::Paid => "PAID",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(InvoiceStatus::Pending),
            "PAID" => Some(InvoiceStatus::Paid),
            _ => None,
        }
    }
}

/// A persisted invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Caller-chosen identifier, unique within the system (1-32 chars)
    pub id: String,

    /// Identifier of the creating user; immutable after creation
    pub owner_id: String,

    /// Display label
    pub name: String,

    /// Opaque serialized document (from/bill-to/ship-to, line items, notes)
    pub document: String,

    pub status: InvoiceStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Create a new pending invoice owned by `owner_id`
    pub fn new(id: String, owner_id: String, name: String, document: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            owner_id,
            name,
            document,
            status: InvoiceStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One billable line on an invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub quantity: Decimal,
    pub rate: Decimal,
}

/// The structured payload behind `Invoice::document`
///
/// Only `items` matters to the payment workflow; the remaining fields are
/// presentation data carried through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDocument {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub bill_to: Option<String>,
    #[serde(default)]
    pub ship_to: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl InvoiceDocument {
    /// Parse a serialized document
    pub fn parse(raw: &str) -> Result<Self, InvoiceError> {
        serde_json::from_str(raw).map_err(|e| InvoiceError::InvalidDocument {
            message: e.to_string(),
        })
    }

    /// Invoice total: `sum(rate * quantity)` rounded half-away-from-zero at
    /// two decimal places
    pub fn total(&self) -> Decimal {
        self.items
            .iter()
            .map(|item| item.rate * item.quantity)
            .sum::<Decimal>()
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Charge amount in integer minor currency units (total x 100)
    ///
    /// The webhook handler and the gateway only ever see this server-computed
    /// value; client-supplied amounts are never trusted.
    pub fn amount_subunits(&self) -> Result<i64, InvoiceError> {
        (self.total() * Decimal::ONE_HUNDRED)
            .to_i64()
            .ok_or_else(|| InvoiceError::InvalidDocument {
                message: "invoice total does not fit in minor currency units".to_string(),
            })
    }
}
