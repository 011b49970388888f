//! # Paylink
//!
//! An invoice sharing and payment service: a user creates an invoice, shares
//! a link to it, and a payer settles it through a third-party payment
//! gateway. The core of the crate is the invoice-payment reconciliation
//! workflow — the state machine that takes an invoice from creation through
//! payment initiation to confirmed settlement, where a signature-verified
//! gateway webhook is the sole source of truth for marking an invoice paid.
//!
//! ## Architecture
//!
//! - [`core`]: domain types, the typed error hierarchy, store traits, the
//!   auth gate, and [`core::lifecycle::InvoiceLifecycle`] — the state machine.
//! - [`gateway`]: the [`gateway::PaymentGateway`] trait and a Paystack REST
//!   client implementation.
//! - [`webhook`]: HMAC-SHA512 signature verification and the tagged event
//!   model for inbound gateway callbacks.
//! - [`storage`]: in-memory stores (default) and a PostgreSQL backend behind
//!   the `postgres` feature.
//! - [`server`]: axum routes, shared state, graceful shutdown.
//! - [`config`]: YAML configuration with environment-variable secrets.
//!
//! ## Guarantees
//!
//! - Charge amounts are recomputed server-side from the invoice's own line
//!   items; client- and webhook-supplied amounts are never authoritative.
//! - Status transitions are monotonic (`Pending` -> `Paid`, never back) and
//!   idempotent under at-least-once, out-of-order webhook delivery.
//! - Transaction references are gateway-assigned and never reused.

pub mod config;
pub mod core;
pub mod gateway;
pub mod server;
pub mod storage;
pub mod webhook;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        auth::{AuthGate, BearerTokenAuth, HeaderAuth},
        error::{GatewayError, InvoiceError, PaylinkError, ValidationError},
        invoice::{Invoice, InvoiceDocument, InvoiceStatus, LineItem},
        lifecycle::{InvoiceLifecycle, InvoiceSummary, PaymentInit, WebhookOutcome},
        payment::{InvoicePayment, PaymentStatus},
        store::{InvoiceStore, PaymentStore},
    };

    // === Gateway ===
    pub use crate::gateway::{
        Bank, InitializedTransaction, PaymentGateway, PaystackClient, TransactionMetadata,
    };

    // === Storage ===
    pub use crate::storage::{InMemoryInvoiceStore, InMemoryPaymentStore};
    #[cfg(feature = "postgres")]
    pub use crate::storage::{PostgresInvoiceStore, PostgresPaymentStore};

    // === Server ===
    pub use crate::server::{AppState, build_router, serve};

    // === Config ===
    pub use crate::config::{AppConfig, AuthMode, GatewayConfig};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;
}
