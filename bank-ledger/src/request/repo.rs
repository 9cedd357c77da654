use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};

use crate::{
    account::{AccountPolicy, PolicyColumns},
    db_op::DbOp,
    primitives::*,
};

use super::{entity::*, error::RequestError};

const REQUEST_COLUMNS: &str = r#"id, requester_id, kind, balance, currency, expires_end,
    deposit_rate, update_period, credit_rate, credit_limit, considered, created_at"#;

#[derive(sqlx::FromRow)]
struct RequestRow {
    id: RequestId,
    requester_id: UserId,
    kind: AccountKind,
    balance: Decimal,
    currency: Currency,
    expires_end: Option<NaiveDate>,
    deposit_rate: Option<Decimal>,
    update_period: Option<i32>,
    credit_rate: Option<Decimal>,
    credit_limit: Option<Decimal>,
    considered: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<RequestRow> for Request {
    type Error = RequestError;

    fn try_from(row: RequestRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let policy = AccountPolicy::from_columns(
            row.kind,
            PolicyColumns {
                deposit_rate: row.deposit_rate,
                update_period: row.update_period,
                credit_rate: row.credit_rate,
                credit_limit: row.credit_limit,
            },
        )
        .map_err(|column| RequestError::MissingPolicyColumn(id, column))?;
        Ok(Request::new(RequestValues {
            id,
            requester_id: row.requester_id,
            balance: row.balance,
            currency: row.currency,
            expires_end: row.expires_end,
            policy,
            considered: row.considered,
            created_at: row.created_at,
        }))
    }
}

fn select_requests(filter: &str) -> String {
    format!("SELECT {REQUEST_COLUMNS} FROM bank_requests {filter}")
}

#[derive(Debug, Clone)]
pub(super) struct RequestRepo {
    pool: PgPool,
}

impl RequestRepo {
    pub fn new(pool: &PgPool) -> Self {
        Self { pool: pool.clone() }
    }

    pub async fn create<'e>(
        &self,
        executor: impl PgExecutor<'e>,
        new_request: &NewRequest,
        now: DateTime<Utc>,
    ) -> Result<Request, RequestError> {
        let columns = new_request.policy.columns();
        let row: RequestRow = sqlx::query_as(&format!(
            r#"INSERT INTO bank_requests
               (requester_id, kind, balance, currency, expires_end,
                deposit_rate, update_period, credit_rate, credit_limit, considered, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, FALSE, $10)
               RETURNING {REQUEST_COLUMNS}"#
        ))
        .bind(new_request.requester_id)
        .bind(new_request.kind())
        .bind(new_request.balance)
        .bind(new_request.currency)
        .bind(new_request.expires_end)
        .bind(columns.deposit_rate)
        .bind(columns.update_period)
        .bind(columns.credit_rate)
        .bind(columns.credit_limit)
        .bind(now)
        .fetch_one(executor)
        .await?;
        row.try_into()
    }

    pub async fn find_by_id(&self, id: RequestId) -> Result<Request, RequestError> {
        let row: Option<RequestRow> = sqlx::query_as(&select_requests("WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.ok_or(RequestError::NotFound(id))?.try_into()
    }

    /// Locks the request row until the op ends.
    pub async fn find_for_update_in_op(
        &self,
        op: &mut DbOp<'_>,
        id: RequestId,
    ) -> Result<Request, RequestError> {
        let row: Option<RequestRow> =
            sqlx::query_as(&select_requests("WHERE id = $1 FOR UPDATE"))
                .bind(id)
                .fetch_optional(op.as_executor())
                .await?;
        row.ok_or(RequestError::NotFound(id))?.try_into()
    }

    pub async fn mark_considered_in_op(
        &self,
        op: &mut DbOp<'_>,
        id: RequestId,
    ) -> Result<(), RequestError> {
        let res = sqlx::query(
            "UPDATE bank_requests SET considered = TRUE WHERE id = $1 AND considered = FALSE",
        )
        .bind(id)
        .execute(op.as_executor())
        .await?;
        if res.rows_affected() == 0 {
            return Err(RequestError::AlreadyConsidered(id));
        }
        Ok(())
    }

    pub async fn list_pending(&self) -> Result<Vec<Request>, RequestError> {
        let rows: Vec<RequestRow> =
            sqlx::query_as(&select_requests("WHERE considered = FALSE ORDER BY id"))
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(Request::try_from).collect()
    }

    pub async fn list_for_requester(
        &self,
        requester_id: UserId,
    ) -> Result<Vec<Request>, RequestError> {
        let rows: Vec<RequestRow> =
            sqlx::query_as(&select_requests("WHERE requester_id = $1 ORDER BY id"))
                .bind(requester_id)
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(Request::try_from).collect()
    }
}
