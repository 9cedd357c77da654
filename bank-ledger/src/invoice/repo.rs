use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};

use crate::{db_op::DbOp, primitives::*};

use super::{entity::*, error::InvoiceError};

const SELECT_INVOICES: &str =
    "SELECT id, requester_id, payer_id, amount, currency, paid, created_at FROM bank_invoices";

#[derive(sqlx::FromRow)]
struct InvoiceRow {
    id: InvoiceId,
    requester_id: AccountId,
    payer_id: AccountId,
    amount: Decimal,
    currency: Currency,
    paid: bool,
    created_at: DateTime<Utc>,
}

impl From<InvoiceRow> for Invoice {
    fn from(row: InvoiceRow) -> Self {
        Invoice::new(InvoiceValues {
            id: row.id,
            requester_id: row.requester_id,
            payer_id: row.payer_id,
            amount: row.amount,
            currency: row.currency,
            paid: row.paid,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone)]
pub(super) struct InvoiceRepo {
    pool: PgPool,
}

impl InvoiceRepo {
    pub fn new(pool: &PgPool) -> Self {
        Self { pool: pool.clone() }
    }

    pub async fn create<'e>(
        &self,
        executor: impl PgExecutor<'e>,
        new_invoice: &NewInvoice,
        now: DateTime<Utc>,
    ) -> Result<Invoice, InvoiceError> {
        let row: InvoiceRow = sqlx::query_as(
            r#"INSERT INTO bank_invoices (requester_id, payer_id, amount, currency, paid, created_at)
               VALUES ($1, $2, $3, $4, FALSE, $5)
               RETURNING id, requester_id, payer_id, amount, currency, paid, created_at"#,
        )
        .bind(new_invoice.requester_id)
        .bind(new_invoice.payer_id)
        .bind(new_invoice.amount)
        .bind(new_invoice.currency)
        .bind(now)
        .fetch_one(executor)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref err) if err.is_foreign_key_violation() => {
                if err.constraint() == Some("bank_invoices_payer_fkey") {
                    InvoiceError::AccountNotFound(new_invoice.payer_id)
                } else {
                    InvoiceError::AccountNotFound(new_invoice.requester_id)
                }
            }
            e => InvoiceError::Sqlx(e),
        })?;
        Ok(row.into())
    }

    pub async fn find_by_id(&self, id: InvoiceId) -> Result<Invoice, InvoiceError> {
        let row: Option<InvoiceRow> = sqlx::query_as(&format!("{SELECT_INVOICES} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Invoice::from).ok_or(InvoiceError::NotFound(id))
    }

    /// Locks the invoice row until the op ends.
    pub async fn find_for_update_in_op(
        &self,
        op: &mut DbOp<'_>,
        id: InvoiceId,
    ) -> Result<Invoice, InvoiceError> {
        let row: Option<InvoiceRow> =
            sqlx::query_as(&format!("{SELECT_INVOICES} WHERE id = $1 FOR UPDATE"))
                .bind(id)
                .fetch_optional(op.as_executor())
                .await?;
        row.map(Invoice::from).ok_or(InvoiceError::NotFound(id))
    }

    pub async fn mark_paid_in_op(
        &self,
        op: &mut DbOp<'_>,
        id: InvoiceId,
    ) -> Result<(), InvoiceError> {
        let res = sqlx::query("UPDATE bank_invoices SET paid = TRUE WHERE id = $1 AND paid = FALSE")
            .bind(id)
            .execute(op.as_executor())
            .await?;
        if res.rows_affected() == 0 {
            return Err(InvoiceError::AlreadyPaid(id));
        }
        Ok(())
    }

    pub async fn list_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Invoice>, InvoiceError> {
        let rows: Vec<InvoiceRow> = sqlx::query_as(&format!(
            "{SELECT_INVOICES} WHERE requester_id = $1 OR payer_id = $1 ORDER BY id"
        ))
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Invoice::from).collect())
    }
}
