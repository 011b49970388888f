//! Paystack REST client
//!
//! Thin reqwest wrapper over the provider's envelope-style API. Every
//! response arrives as `{ status, message, data }`; a `status: false`
//! envelope becomes [`GatewayError::Declined`] carrying the remote message,
//! everything below that (connect, timeout, malformed body) becomes
//! [`GatewayError::Transport`].

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::config::GatewayConfig;
use crate::core::error::GatewayError;
use crate::gateway::{
    Bank, InitializedTransaction, PaymentGateway, TransactionMetadata, TransferHandle,
};

/// Response envelope shared by all gateway endpoints
#[derive(Debug, serde::Deserialize)]
struct Envelope<T> {
    status: bool,
    message: String,
    data: Option<T>,
}

#[derive(Debug, serde::Deserialize)]
struct RecipientData {
    recipient_code: String,
}

#[derive(Debug, serde::Deserialize)]
struct TransferStatusData {
    status: String,
}

/// HTTP client for the Paystack REST API
///
/// One shared instance per process; `reqwest::Client` pools connections
/// internally so cloning the wrapper is cheap.
#[derive(Clone)]
pub struct PaystackClient {
    http: reqwest::Client,
    base_url: String,
    currency: String,
}

impl PaystackClient {
    /// Build a client from gateway configuration
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.secret_key)).map_err(
            |e| GatewayError::Transport {
                message: format!("invalid gateway secret: {}", e),
            },
        )?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(GatewayError::from)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            currency: config.currency.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, GatewayError> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        Self::unwrap_envelope(response).await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, GatewayError> {
        let response = self.http.get(self.url(path)).query(query).send().await?;
        Self::unwrap_envelope(response).await
    }

    async fn unwrap_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        // The gateway reports failures through the envelope, not the HTTP
        // status line, so the body is parsed unconditionally.
        let envelope: Envelope<T> =
            response
                .json()
                .await
                .map_err(|e| GatewayError::Transport {
                    message: format!("unreadable gateway response: {}", e),
                })?;
        if !envelope.status {
            return Err(GatewayError::Declined {
                message: envelope.message,
            });
        }
        envelope.data.ok_or_else(|| GatewayError::Transport {
            message: "gateway envelope missing data".to_string(),
        })
    }
}

#[async_trait]
impl PaymentGateway for PaystackClient {
    async fn initialize_transaction(
        &self,
        amount: i64,
        email: &str,
        metadata: TransactionMetadata,
    ) -> Result<InitializedTransaction, GatewayError> {
        self.post(
            "/transaction/initialize",
            &json!({
                "amount": amount.to_string(),
                "email": email,
                "metadata": metadata,
                "currency": self.currency,
            }),
        )
        .await
    }

    async fn list_banks(&self, country: &str, currency: &str) -> Result<Vec<Bank>, GatewayError> {
        self.get("/bank", &[("country", country), ("currency", currency)])
            .await
    }

    async fn create_transfer_recipient(
        &self,
        name: &str,
        bank_code: &str,
        account_number: &str,
    ) -> Result<String, GatewayError> {
        let data: RecipientData = self
            .post(
                "/transferrecipient",
                &json!({
                    "type": "nuban",
                    "name": name,
                    "bank_code": bank_code,
                    "account_number": account_number,
                    "currency": self.currency,
                }),
            )
            .await?;
        Ok(data.recipient_code)
    }

    async fn initiate_transfer(
        &self,
        amount: i64,
        recipient_code: &str,
        reason: Option<&str>,
    ) -> Result<TransferHandle, GatewayError> {
        self.post(
            "/transfer",
            &json!({
                "source": "balance",
                "amount": amount.to_string(),
                "recipient": recipient_code,
                "reason": reason,
            }),
        )
        .await
    }

    async fn finalize_transfer(
        &self,
        transfer_code: &str,
        otp: &str,
    ) -> Result<String, GatewayError> {
        let data: TransferStatusData = self
            .post(
                "/transfer/finalize_transfer",
                &json!({
                    "transfer_code": transfer_code,
                    "otp": otp,
                }),
            )
            .await?;
        Ok(data.status)
    }
}
