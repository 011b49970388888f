//! PostgreSQL storage backend using sqlx.
//!
//! Two tables back the payment workflow: `invoices` and `invoice_payments`,
//! with `invoice_payments.tx_ref` unique and `invoice_payments.invoice_id`
//! referencing `invoices.id`. Status transitions are row-level
//! `UPDATE ... WHERE` statements, which is all the compare-and-swap the
//! workflow needs to avoid lost updates.
//!
//! # Feature flag
//!
//! This module is gated behind the `postgres` feature flag:
//! ```toml
//! [dependencies]
//! paylink = { version = "0.1", features = ["postgres"] }
//! ```

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::core::invoice::{Invoice, InvoiceStatus};
use crate::core::payment::{InvoicePayment, PaymentStatus, PaymentTransition};
use crate::core::store::{InvoiceStore, PaymentStore};

/// Create the two workflow tables when they do not exist yet
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS invoices (
            id          VARCHAR(32) PRIMARY KEY,
            owner_id    TEXT        NOT NULL,
            name        TEXT        NOT NULL,
            document    TEXT        NOT NULL,
            status      TEXT        NOT NULL,
            created_at  TIMESTAMPTZ NOT NULL,
            updated_at  TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .context("creating invoices table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS invoice_payments (
            id          UUID        PRIMARY KEY,
            tx_ref      TEXT        NOT NULL UNIQUE,
            invoice_id  VARCHAR(32) NOT NULL REFERENCES invoices(id),
            email       TEXT        NOT NULL,
            amount      BIGINT      NOT NULL,
            status      TEXT        NOT NULL,
            created_at  TIMESTAMPTZ NOT NULL,
            updated_at  TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .context("creating invoice_payments table")?;

    Ok(())
}

// A status column holding anything but the known variants means the table
// was written by something else; surfaced as a storage failure, not a panic.
fn decode_invoice_status(raw: &str) -> Result<InvoiceStatus> {
    InvoiceStatus::parse(raw).with_context(|| format!("unknown invoice status '{}'", raw))
}

fn decode_payment_status(raw: &str) -> Result<PaymentStatus> {
    PaymentStatus::parse(raw).with_context(|| format!("unknown payment status '{}'", raw))
}

fn invoice_from_row(row: &PgRow) -> Result<Invoice> {
    let status: String = row.try_get("status")?;
    Ok(Invoice {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        name: row.try_get("name")?,
        document: row.try_get("document")?,
        status: decode_invoice_status(&status)?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

fn payment_from_row(row: &PgRow) -> Result<InvoicePayment> {
    let status: String = row.try_get("status")?;
    Ok(InvoicePayment {
        id: row.try_get::<Uuid, _>("id")?,
        tx_ref: row.try_get("tx_ref")?,
        invoice_id: row.try_get("invoice_id")?,
        email: row.try_get("email")?,
        amount: row.try_get("amount")?,
        status: decode_payment_status(&status)?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

/// Invoice store backed by PostgreSQL
#[derive(Clone, Debug)]
pub struct PostgresInvoiceStore {
    pool: PgPool,
}

impl PostgresInvoiceStore {
    /// Create a new store with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvoiceStore for PostgresInvoiceStore {
    async fn insert(&self, invoice: Invoice) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO invoices (id, owner_id, name, document, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&invoice.id)
        .bind(&invoice.owner_id)
        .bind(&invoice.name)
        .bind(&invoice.document)
        .bind(invoice.status.as_str())
        .bind(invoice.created_at)
        .bind(invoice.updated_at)
        .execute(&self.pool)
        .await
        .context("inserting invoice")?;

        Ok(result.rows_affected() == 1)
    }

    async fn get(&self, id: &str) -> Result<Option<Invoice>> {
        let row = sqlx::query("SELECT * FROM invoices WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("fetching invoice")?;

        row.as_ref().map(invoice_from_row).transpose()
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Invoice>> {
        let rows = sqlx::query("SELECT * FROM invoices WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .context("listing invoices")?;

        rows.iter().map(invoice_from_row).collect()
    }

    async fn mark_paid(&self, id: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE invoices SET status = $1, updated_at = $2 WHERE id = $3 AND status = $4",
        )
        .bind(InvoiceStatus::Paid.as_str())
        .bind(Utc::now())
        .bind(id)
        .bind(InvoiceStatus::Pending.as_str())
        .execute(&self.pool)
        .await
        .context("marking invoice paid")?;

        Ok(result.rows_affected() == 1)
    }
}

/// Payment store backed by PostgreSQL
#[derive(Clone, Debug)]
pub struct PostgresPaymentStore {
    pool: PgPool,
}

impl PostgresPaymentStore {
    /// Create a new store with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentStore for PostgresPaymentStore {
    async fn insert(&self, payment: InvoicePayment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO invoice_payments
                (id, tx_ref, invoice_id, email, amount, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(payment.id)
        .bind(&payment.tx_ref)
        .bind(&payment.invoice_id)
        .bind(&payment.email)
        .bind(payment.amount)
        .bind(payment.status.as_str())
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&self.pool)
        .await
        .context("inserting payment")?;

        Ok(())
    }

    async fn get_by_tx_ref(&self, tx_ref: &str) -> Result<Option<InvoicePayment>> {
        let row = sqlx::query("SELECT * FROM invoice_payments WHERE tx_ref = $1")
            .bind(tx_ref)
            .fetch_optional(&self.pool)
            .await
            .context("fetching payment")?;

        row.as_ref().map(payment_from_row).transpose()
    }

    async fn mark_success(&self, tx_ref: &str) -> Result<Option<PaymentTransition>> {
        // Lock the row so the previous status and the update are one unit.
        let mut tx = self.pool.begin().await.context("starting transaction")?;

        let row = sqlx::query("SELECT * FROM invoice_payments WHERE tx_ref = $1 FOR UPDATE")
            .bind(tx_ref)
            .fetch_optional(&mut *tx)
            .await
            .context("locking payment row")?;

        let Some(row) = row else {
            tx.rollback().await.ok();
            return Ok(None);
        };
        let mut payment = payment_from_row(&row)?;
        let previous = payment.status;

        if previous == PaymentStatus::Pending {
            let updated_at = Utc::now();
            sqlx::query(
                "UPDATE invoice_payments SET status = $1, updated_at = $2 WHERE tx_ref = $3",
            )
            .bind(PaymentStatus::Success.as_str())
            .bind(updated_at)
            .bind(tx_ref)
            .execute(&mut *tx)
            .await
            .context("marking payment success")?;
            payment.status = PaymentStatus::Success;
            payment.updated_at = updated_at;
        }

        tx.commit().await.context("committing payment transition")?;
        Ok(Some(PaymentTransition { payment, previous }))
    }
}
