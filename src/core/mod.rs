//! Core domain: invoices, payments, errors, stores, and the lifecycle manager

pub mod auth;
pub mod error;
pub mod invoice;
pub mod lifecycle;
pub mod payment;
pub mod store;

pub use auth::AuthGate;
pub use error::{GatewayError, InvoiceError, PaylinkError, StorageError, ValidationError};
pub use invoice::{Invoice, InvoiceDocument, InvoiceStatus, LineItem};
pub use lifecycle::{InvoiceLifecycle, InvoiceSummary, PaymentInit, WebhookOutcome};
pub use payment::{InvoicePayment, PaymentStatus, PaymentTransition};
pub use store::{InvoiceStore, PaymentStore};
