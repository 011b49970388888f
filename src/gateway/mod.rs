//! Payment gateway integration
//!
//! The [`PaymentGateway`] trait is the seam between the invoice workflow and
//! the remote provider: the lifecycle manager and the HTTP layer receive an
//! explicitly constructed, shared client instance at startup (no global SDK
//! singletons), and tests substitute a mock.
//!
//! Each operation is a single request/response with no local state and no
//! retries; retry policy, if any, belongs to the caller.

pub mod client;

pub use client::PaystackClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::error::GatewayError;

/// Metadata attached to a remote transaction at initiation time
///
/// Echoed back verbatim inside webhook events; `invoice_id` is what lets an
/// event be cross-checked against local state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionMetadata {
    #[serde(rename = "invoiceId")]
    pub invoice_id: String,
}

/// Result of initializing a remote transaction
#[derive(Debug, Clone, Deserialize)]
pub struct InitializedTransaction {
    /// Gateway-assigned transaction reference (`tx_ref` locally)
    pub reference: String,

    /// URL the payer is sent to for completing the charge
    pub authorization_url: String,

    /// Gateway access code for inline checkout widgets
    pub access_code: String,
}

/// A bank known to the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bank {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Handle to an initiated transfer
#[derive(Debug, Clone, Deserialize)]
pub struct TransferHandle {
    pub transfer_code: String,
    pub status: String,
}

/// Remote operations offered by the payment provider
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Initialize a transaction for `amount` minor units charged to `email`
    async fn initialize_transaction(
        &self,
        amount: i64,
        email: &str,
        metadata: TransactionMetadata,
    ) -> Result<InitializedTransaction, GatewayError>;

    /// List banks supported for the given country and currency
    async fn list_banks(&self, country: &str, currency: &str) -> Result<Vec<Bank>, GatewayError>;

    /// Register a transfer recipient; returns the recipient code
    async fn create_transfer_recipient(
        &self,
        name: &str,
        bank_code: &str,
        account_number: &str,
    ) -> Result<String, GatewayError>;

    /// Move `amount` minor units to a previously created recipient
    async fn initiate_transfer(
        &self,
        amount: i64,
        recipient_code: &str,
        reason: Option<&str>,
    ) -> Result<TransferHandle, GatewayError>;

    /// Complete an OTP-gated transfer; returns the final transfer status
    async fn finalize_transfer(
        &self,
        transfer_code: &str,
        otp: &str,
    ) -> Result<String, GatewayError>;
}
