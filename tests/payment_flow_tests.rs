//! End-to-end payment flow: initiate a charge against an invoice, then settle
//! it through the signed gateway webhook. Covers idempotent redelivery,
//! signature rejection, and ignored event shapes.

mod common;

use common::{charge_success_body, sign, sign_with, test_app};
use paylink::core::invoice::InvoiceStatus;
use paylink::core::payment::PaymentStatus;
use paylink::core::store::{InvoiceStore, PaymentStore};
use serde_json::{Value, json};

const DOC: &str = r#"{"items": [{"name": "Design", "quantity": 1, "rate": 500}]}"#;

async fn create_invoice(app: &common::TestApp, id: &str) {
    app.server
        .post("/invoices")
        .add_header("x-user-id", "user-a")
        .json(&json!({ "id": id, "name": "Website design", "data": DOC }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);
}

async fn initiate(app: &common::TestApp, invoice_id: &str) -> Value {
    let response = app
        .server
        .post("/payments")
        .json(&json!({
            "invoiceId": invoice_id,
            "email": "payer@example.com",
            "name": "Pat Payer"
        }))
        .await;
    response.assert_status_ok();
    response.json()
}

#[tokio::test]
async fn test_initiate_payment_charges_recomputed_amount() {
    let app = test_app();
    create_invoice(&app, "1").await;

    let init = initiate(&app, "1").await;
    assert_eq!(init["amount"], 50_000); // 500.00 in subunits
    assert_eq!(init["tx_ref"], "TX-0001");
    assert_eq!(init["tx_url"], "https://checkout.test/1");

    // A pending payment row is on record before any webhook arrives
    let payment = app
        .payments
        .get_by_tx_ref("TX-0001")
        .await
        .unwrap()
        .expect("payment row should exist");
    assert_eq!(payment.invoice_id, "1");
    assert_eq!(payment.amount, 50_000);
    assert_eq!(payment.status, PaymentStatus::Pending);
}

#[tokio::test]
async fn test_initiate_payment_validates_payer_fields() {
    let app = test_app();
    create_invoice(&app, "1").await;

    let response = app
        .server
        .post("/payments")
        .json(&json!({ "invoiceId": "1", "email": "not-an-email", "name": "" }))
        .await;
    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["details"]["fields"]["email"].is_string());
    assert_eq!(body["details"]["fields"]["name"], "Full name is required");
    assert_eq!(app.gateway.init_calls(), 0);
}

#[tokio::test]
async fn test_initiate_payment_unknown_invoice() {
    let app = test_app();

    let response = app
        .server
        .post("/payments")
        .json(&json!({
            "invoiceId": "missing",
            "email": "payer@example.com",
            "name": "Pat Payer"
        }))
        .await;
    response.assert_status_not_found();
    assert_eq!(app.gateway.init_calls(), 0);
}

#[tokio::test]
async fn test_webhook_settles_invoice() {
    let app = test_app();
    create_invoice(&app, "1").await;
    let init = initiate(&app, "1").await;
    let tx_ref = init["tx_ref"].as_str().unwrap();

    let body = charge_success_body(tx_ref, "1", 50_000);
    let response = app
        .server
        .post("/webhooks/gateway")
        .add_header("x-paystack-signature", sign(&body))
        .bytes(body.into())
        .await;
    response.assert_status_ok();
    let ack: Value = response.json();
    assert_eq!(ack["message"], "Received");

    let payment = app.payments.get_by_tx_ref(tx_ref).await.unwrap().unwrap();
    assert_eq!(payment.status, PaymentStatus::Success);
    let invoice = app.invoices.get("1").await.unwrap().unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Paid);
}

#[tokio::test]
async fn test_webhook_redelivery_is_idempotent() {
    let app = test_app();
    create_invoice(&app, "1").await;
    let init = initiate(&app, "1").await;
    let tx_ref = init["tx_ref"].as_str().unwrap().to_string();

    let body = charge_success_body(&tx_ref, "1", 50_000);
    for _ in 0..3 {
        app.server
            .post("/webhooks/gateway")
            .add_header("x-paystack-signature", sign(&body))
            .bytes(body.clone().into())
            .await
            .assert_status_ok();
    }

    let invoice = app.invoices.get("1").await.unwrap().unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Paid);
}

#[tokio::test]
async fn test_webhook_rejects_bad_signature() {
    let app = test_app();
    create_invoice(&app, "1").await;
    let init = initiate(&app, "1").await;
    let tx_ref = init["tx_ref"].as_str().unwrap().to_string();

    let body = charge_success_body(&tx_ref, "1", 50_000);

    // Wrong secret
    let response = app
        .server
        .post("/webhooks/gateway")
        .add_header("x-paystack-signature", sign_with("sk_wrong", &body))
        .bytes(body.clone().into())
        .await;
    response.assert_status_unauthorized();
    let ack: Value = response.json();
    assert_eq!(ack["message"], "Unauthorized");

    // Missing header entirely
    app.server
        .post("/webhooks/gateway")
        .bytes(body.into())
        .await
        .assert_status_unauthorized();

    // Nothing moved
    let invoice = app.invoices.get("1").await.unwrap().unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Pending);
    let payment = app.payments.get_by_tx_ref(&tx_ref).await.unwrap().unwrap();
    assert_eq!(payment.status, PaymentStatus::Pending);
}

#[tokio::test]
async fn test_webhook_ignores_other_events_and_failed_charges() {
    let app = test_app();
    create_invoice(&app, "1").await;
    let init = initiate(&app, "1").await;
    let tx_ref = init["tx_ref"].as_str().unwrap().to_string();

    // An event type this service does not act on
    let body = serde_json::to_vec(&json!({
        "event": "transfer.success",
        "data": { "reference": tx_ref }
    }))
    .unwrap();
    app.server
        .post("/webhooks/gateway")
        .add_header("x-paystack-signature", sign(&body))
        .bytes(body.into())
        .await
        .assert_status_ok();

    // charge.success whose embedded status is not success
    let body = serde_json::to_vec(&json!({
        "event": "charge.success",
        "data": { "status": "failed", "reference": tx_ref }
    }))
    .unwrap();
    app.server
        .post("/webhooks/gateway")
        .add_header("x-paystack-signature", sign(&body))
        .bytes(body.into())
        .await
        .assert_status_ok();

    let invoice = app.invoices.get("1").await.unwrap().unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Pending);
}

#[tokio::test]
async fn test_webhook_with_unknown_reference_is_acknowledged() {
    let app = test_app();
    create_invoice(&app, "1").await;

    let body = charge_success_body("TX-never-issued", "1", 50_000);
    app.server
        .post("/webhooks/gateway")
        .add_header("x-paystack-signature", sign(&body))
        .bytes(body.into())
        .await
        .assert_status_ok();

    let invoice = app.invoices.get("1").await.unwrap().unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Pending);
}

#[tokio::test]
async fn test_settled_invoice_rejects_further_payment_attempts() {
    let app = test_app();
    create_invoice(&app, "1").await;
    let init = initiate(&app, "1").await;
    let tx_ref = init["tx_ref"].as_str().unwrap().to_string();

    let body = charge_success_body(&tx_ref, "1", 50_000);
    app.server
        .post("/webhooks/gateway")
        .add_header("x-paystack-signature", sign(&body))
        .bytes(body.into())
        .await
        .assert_status_ok();

    let response = app
        .server
        .post("/payments")
        .json(&json!({
            "invoiceId": "1",
            "email": "payer@example.com",
            "name": "Pat Payer"
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVOICE_ALREADY_PAID");
    // The gateway saw only the original initialization
    assert_eq!(app.gateway.init_calls(), 1);
}

#[tokio::test]
async fn test_each_payment_attempt_gets_a_fresh_reference() {
    let app = test_app();
    create_invoice(&app, "1").await;

    let first = initiate(&app, "1").await;
    let second = initiate(&app, "1").await;
    assert_ne!(first["tx_ref"], second["tx_ref"]);
    assert_eq!(app.gateway.init_calls(), 2);

    // Settling the second attempt still pays the invoice
    let tx_ref = second["tx_ref"].as_str().unwrap();
    let body = charge_success_body(tx_ref, "1", 50_000);
    app.server
        .post("/webhooks/gateway")
        .add_header("x-paystack-signature", sign(&body))
        .bytes(body.into())
        .await
        .assert_status_ok();

    let invoice = app.invoices.get("1").await.unwrap().unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Paid);
}
