//! Shared fixture for integration tests: an in-memory application behind
//! `axum_test::TestServer`, a scripted gateway stub, and webhook signing
//! helpers.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum_test::TestServer;
use hmac::{Hmac, Mac};
use sha2::Sha512;

use paylink::core::auth::HeaderAuth;
use paylink::core::error::GatewayError;
use paylink::core::lifecycle::InvoiceLifecycle;
use paylink::gateway::{
    Bank, InitializedTransaction, PaymentGateway, TransactionMetadata, TransferHandle,
};
use paylink::server::{AppState, build_router};
use paylink::storage::{InMemoryInvoiceStore, InMemoryPaymentStore};

pub const WEBHOOK_SECRET: &str = "sk_test_webhook_secret";

/// Gateway stub handing out sequential references and counting calls
pub struct ScriptedGateway {
    init_calls: AtomicUsize,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self {
            init_calls: AtomicUsize::new(0),
        }
    }

    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn initialize_transaction(
        &self,
        _amount: i64,
        _email: &str,
        _metadata: TransactionMetadata,
    ) -> Result<InitializedTransaction, GatewayError> {
        let n = self.init_calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(InitializedTransaction {
            reference: format!("TX-{:04}", n),
            authorization_url: format!("https://checkout.test/{}", n),
            access_code: format!("AC-{:04}", n),
        })
    }

    async fn list_banks(&self, _: &str, _: &str) -> Result<Vec<Bank>, GatewayError> {
        Ok(vec![
            Bank {
                name: "First Bank".to_string(),
                code: "011".to_string(),
                currency: Some("NGN".to_string()),
            },
            Bank {
                name: "Kuda Bank".to_string(),
                code: "50211".to_string(),
                currency: Some("NGN".to_string()),
            },
        ])
    }

    async fn create_transfer_recipient(
        &self,
        _: &str,
        _: &str,
        _: &str,
    ) -> Result<String, GatewayError> {
        Ok("RCP_test".to_string())
    }

    async fn initiate_transfer(
        &self,
        _: i64,
        _: &str,
        _: Option<&str>,
    ) -> Result<TransferHandle, GatewayError> {
        Ok(TransferHandle {
            transfer_code: "TRF_test".to_string(),
            status: "pending".to_string(),
        })
    }

    async fn finalize_transfer(&self, _: &str, _: &str) -> Result<String, GatewayError> {
        Ok("success".to_string())
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub invoices: Arc<InMemoryInvoiceStore>,
    pub payments: Arc<InMemoryPaymentStore>,
    pub gateway: Arc<ScriptedGateway>,
}

/// Build a test application with in-memory stores and header-based auth
pub fn test_app() -> TestApp {
    let invoices = Arc::new(InMemoryInvoiceStore::new());
    let payments = Arc::new(InMemoryPaymentStore::new());
    let gateway = Arc::new(ScriptedGateway::new());

    let lifecycle = Arc::new(InvoiceLifecycle::new(
        invoices.clone(),
        payments.clone(),
        gateway.clone(),
    ));
    let state = AppState {
        lifecycle,
        gateway: gateway.clone(),
        auth: Arc::new(HeaderAuth),
        webhook_secret: WEBHOOK_SECRET.to_string(),
    };

    let server = TestServer::new(build_router(state));
    TestApp {
        server,
        invoices,
        payments,
        gateway,
    }
}

/// Hex HMAC-SHA512 of `body` with `secret`, as the gateway would send it
pub fn sign_with(secret: &str, body: &[u8]) -> String {
    let mut mac = Hmac::<Sha512>::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Sign with the fixture's webhook secret
pub fn sign(body: &[u8]) -> String {
    sign_with(WEBHOOK_SECRET, body)
}

/// A well-formed `charge.success` webhook body
pub fn charge_success_body(tx_ref: &str, invoice_id: &str, amount: i64) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "event": "charge.success",
        "data": {
            "status": "success",
            "reference": tx_ref,
            "amount": amount,
            "metadata": { "invoiceId": invoice_id }
        }
    }))
    .expect("serializing webhook body")
}
