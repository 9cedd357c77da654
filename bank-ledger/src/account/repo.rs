use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};

use crate::{db_op::DbOp, primitives::*};

use super::{entity::*, error::AccountError};

const SELECT_ACCOUNTS: &str = r#"
    SELECT a.id, a.kind, a.balance, a.currency, a.expires_end, a.status,
           a.deposit_rate, a.update_period, a.credit_rate, a.credit_limit,
           a.last_accrued_at, a.created_at,
           COALESCE(
             array_agg(h.user_id ORDER BY h.user_id) FILTER (WHERE h.user_id IS NOT NULL),
             '{}'
           ) AS holders
    FROM bank_accounts a
    LEFT JOIN bank_account_holders h ON h.account_id = a.id
"#;

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: AccountId,
    kind: AccountKind,
    balance: Decimal,
    currency: Currency,
    expires_end: Option<NaiveDate>,
    status: Status,
    deposit_rate: Option<Decimal>,
    update_period: Option<i32>,
    credit_rate: Option<Decimal>,
    credit_limit: Option<Decimal>,
    last_accrued_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    holders: Vec<i64>,
}

impl TryFrom<AccountRow> for Account {
    type Error = AccountError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
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
        .map_err(|column| AccountError::MissingPolicyColumn(id, column))?;
        Ok(Account::new(AccountValues {
            id,
            balance: row.balance,
            currency: row.currency,
            expires_end: row.expires_end,
            status: row.status,
            holders: row.holders.into_iter().map(UserId::from).collect(),
            policy,
            last_accrued_at: row.last_accrued_at,
            created_at: row.created_at,
        }))
    }
}

fn into_accounts(rows: Vec<AccountRow>) -> Result<Vec<Account>, AccountError> {
    rows.into_iter().map(Account::try_from).collect()
}

#[derive(Debug, Clone)]
pub(super) struct AccountRepo {
    pool: PgPool,
}

impl AccountRepo {
    pub fn new(pool: &PgPool) -> Self {
        Self { pool: pool.clone() }
    }

    pub async fn create_in_op(
        &self,
        op: &mut DbOp<'_>,
        new_account: &NewAccount,
    ) -> Result<AccountId, AccountError> {
        let columns = new_account.policy.columns();
        let now = op.now();
        let id: i64 = sqlx::query_scalar(
            r#"INSERT INTO bank_accounts
               (kind, balance, currency, expires_end, status,
                deposit_rate, update_period, credit_rate, credit_limit,
                last_accrued_at, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
               RETURNING id"#,
        )
        .bind(new_account.policy.kind())
        .bind(new_account.balance)
        .bind(new_account.currency)
        .bind(new_account.expires_end)
        .bind(new_account.status)
        .bind(columns.deposit_rate)
        .bind(columns.update_period)
        .bind(columns.credit_rate)
        .bind(columns.credit_limit)
        .bind(now)
        .fetch_one(op.as_executor())
        .await?;
        Ok(AccountId::from(id))
    }

    pub async fn insert_holder_in_op(
        &self,
        op: &mut DbOp<'_>,
        account_id: AccountId,
        user_id: UserId,
        permission: Permission,
    ) -> Result<(), AccountError> {
        let now = op.now();
        sqlx::query(
            r#"INSERT INTO bank_account_holders (account_id, user_id, permission, created_at)
               VALUES ($1, $2, $3, $4)"#,
        )
        .bind(account_id)
        .bind(user_id)
        .bind(permission)
        .bind(now)
        .execute(op.as_executor())
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref err) if err.is_unique_violation() => {
                AccountError::DuplicateHolder(account_id, user_id)
            }
            sqlx::Error::Database(ref err) if err.is_foreign_key_violation() => {
                AccountError::NotFound(account_id)
            }
            e => AccountError::Sqlx(e),
        })?;
        Ok(())
    }

    pub async fn find_by_id<'e>(
        &self,
        executor: impl PgExecutor<'e>,
        id: AccountId,
    ) -> Result<Account, AccountError> {
        let row: Option<AccountRow> =
            sqlx::query_as(&format!("{SELECT_ACCOUNTS} WHERE a.id = $1 GROUP BY a.id"))
                .bind(id)
                .fetch_optional(executor)
                .await?;
        row.ok_or(AccountError::NotFound(id))?.try_into()
    }

    /// Row-locks the account for the rest of the op before loading it.
    pub async fn find_by_id_for_update_in_op(
        &self,
        op: &mut DbOp<'_>,
        id: AccountId,
    ) -> Result<Account, AccountError> {
        let locked: Option<i64> =
            sqlx::query_scalar("SELECT id FROM bank_accounts WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(op.as_executor())
                .await?;
        if locked.is_none() {
            return Err(AccountError::NotFound(id));
        }
        self.find_by_id(op.as_executor(), id).await
    }

    pub async fn find_kind(&self, id: AccountId) -> Result<AccountKind, AccountError> {
        let kind: Option<AccountKind> =
            sqlx::query_scalar("SELECT kind FROM bank_accounts WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        kind.ok_or(AccountError::NotFound(id))
    }

    pub async fn find_status_in_op(
        &self,
        op: &mut DbOp<'_>,
        id: AccountId,
    ) -> Result<Status, AccountError> {
        let status: Option<Status> =
            sqlx::query_scalar("SELECT status FROM bank_accounts WHERE id = $1")
                .bind(id)
                .fetch_optional(op.as_executor())
                .await?;
        status.ok_or(AccountError::NotFound(id))
    }

    /// Row-locks an account that is not closed. The no-op write makes a concurrent
    /// serializable closer fail instead of missing this op's changes.
    pub async fn lock_unless_closed_in_op(
        &self,
        op: &mut DbOp<'_>,
        id: AccountId,
    ) -> Result<Option<Status>, AccountError> {
        let status: Option<Status> = sqlx::query_scalar(
            r#"UPDATE bank_accounts SET status = status
               WHERE id = $1 AND status <> 'closed'
               RETURNING status"#,
        )
        .bind(id)
        .fetch_optional(op.as_executor())
        .await?;
        Ok(status)
    }

    pub async fn update_status_in_op(
        &self,
        op: &mut DbOp<'_>,
        id: AccountId,
        status: Status,
    ) -> Result<(), AccountError> {
        let res = sqlx::query("UPDATE bank_accounts SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(op.as_executor())
            .await?;
        if res.rows_affected() == 0 {
            return Err(AccountError::NotFound(id));
        }
        Ok(())
    }

    pub async fn update_balance_in_op(
        &self,
        op: &mut DbOp<'_>,
        id: AccountId,
        balance: Decimal,
    ) -> Result<(), AccountError> {
        let res = sqlx::query("UPDATE bank_accounts SET balance = $2 WHERE id = $1")
            .bind(id)
            .bind(balance)
            .execute(op.as_executor())
            .await?;
        if res.rows_affected() == 0 {
            return Err(AccountError::NotFound(id));
        }
        Ok(())
    }

    pub async fn update_accrual_in_op(
        &self,
        op: &mut DbOp<'_>,
        id: AccountId,
        balance: Decimal,
        accrued_through: DateTime<Utc>,
    ) -> Result<(), AccountError> {
        let res = sqlx::query(
            "UPDATE bank_accounts SET balance = $2, last_accrued_at = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(balance)
        .bind(accrued_through)
        .execute(op.as_executor())
        .await?;
        if res.rows_affected() == 0 {
            return Err(AccountError::NotFound(id));
        }
        Ok(())
    }

    pub async fn remove_holders_in_op(
        &self,
        op: &mut DbOp<'_>,
        account_id: AccountId,
    ) -> Result<u64, AccountError> {
        let res = sqlx::query("DELETE FROM bank_account_holders WHERE account_id = $1")
            .bind(account_id)
            .execute(op.as_executor())
            .await?;
        Ok(res.rows_affected())
    }

    pub async fn list_by_status(&self, status: Status) -> Result<Vec<Account>, AccountError> {
        let rows: Vec<AccountRow> = sqlx::query_as(&format!(
            "{SELECT_ACCOUNTS} WHERE a.status = $1 GROUP BY a.id ORDER BY a.id"
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        into_accounts(rows)
    }

    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Account>, AccountError> {
        let rows: Vec<AccountRow> = sqlx::query_as(&format!(
            r#"{SELECT_ACCOUNTS}
               WHERE a.id IN (SELECT account_id FROM bank_account_holders WHERE user_id = $1)
               GROUP BY a.id ORDER BY a.id"#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        into_accounts(rows)
    }
}
