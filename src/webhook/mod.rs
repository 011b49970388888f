//! Gateway webhook verification and event model
//!
//! The webhook is the sole source of truth for marking an invoice paid, so
//! this module is deliberately strict: the signature covers the exact raw
//! request body, the payload is a tagged union over known event types, and
//! anything unknown degrades to an acknowledged no-op instead of an error.

pub mod handler;

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Header carrying the hex-encoded HMAC-SHA512 of the request body
pub const SIGNATURE_HEADER: &str = "x-paystack-signature";

/// Verify a webhook signature against the raw request body
///
/// The comparison runs through the MAC's own constant-time verification; a
/// header that is not even valid hex is rejected the same way as a wrong
/// digest.
pub fn verify_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature) else {
        return false;
    };
    let mut mac =
        HmacSha512::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Inbound gateway event, tagged by the `event` field
///
/// Only `charge.success` can drive a state change; every other event type
/// deserializes to [`GatewayEvent::Other`] and is acknowledged untouched.
#[derive(Debug, Deserialize)]
#[serde(tag = "event")]
pub enum GatewayEvent {
    #[serde(rename = "charge.success")]
    ChargeSuccess { data: ChargeEventData },

    #[serde(other)]
    Other,
}

/// Payload of a `charge.success` event
#[derive(Debug, Deserialize)]
pub struct ChargeEventData {
    /// Embedded charge status; only `"success"` qualifies
    pub status: String,

    /// Gateway transaction reference, the join key to the local payment row
    pub reference: String,

    /// Amount the gateway reports having charged, in minor units
    #[serde(default)]
    pub amount: Option<i64>,

    #[serde(default)]
    pub metadata: Option<ChargeMetadata>,
}

/// Transaction metadata echoed back by the gateway
#[derive(Debug, Deserialize)]
pub struct ChargeMetadata {
    #[serde(rename = "invoiceId")]
    pub invoice_id: Option<String>,
}

impl ChargeEventData {
    /// Whether this charge qualifies for a state transition
    pub fn is_successful(&self) -> bool {
        self.status == "success"
    }

    pub fn invoice_id(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.invoice_id.as_deref())
    }
}
