//! [Account] rows and their holder links.
//!
//! Every mutating operation runs inside a caller supplied [`DbOp`] and
//! never commits or rolls back by itself.
mod entity;
pub mod error;
mod repo;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use crate::{db_op::DbOp, primitives::*};

pub use entity::*;
use error::*;
use repo::*;

/// Service for working with `Account` entities.
#[derive(Clone)]
pub struct Accounts {
    repo: AccountRepo,
    pool: PgPool,
}

impl Accounts {
    pub(crate) fn new(pool: &PgPool) -> Self {
        Self {
            repo: AccountRepo::new(pool),
            pool: pool.clone(),
        }
    }

    #[instrument(name = "bank_ledger.accounts.create_in_op", skip(self, op), err)]
    pub async fn create_in_op(
        &self,
        op: &mut DbOp<'_>,
        new_account: &NewAccount,
    ) -> Result<AccountId, AccountError> {
        self.repo.create_in_op(op, new_account).await
    }

    #[instrument(name = "bank_ledger.accounts.add_holder_in_op", skip(self, op), err)]
    pub async fn add_holder_in_op(
        &self,
        op: &mut DbOp<'_>,
        account_id: AccountId,
        user_id: UserId,
        permission: Permission,
    ) -> Result<(), AccountError> {
        self.repo
            .insert_holder_in_op(op, account_id, user_id, permission)
            .await
    }

    #[instrument(name = "bank_ledger.accounts.find_by_id", skip(self), err)]
    pub async fn find_by_id(&self, id: AccountId) -> Result<Account, AccountError> {
        self.repo.find_by_id(&self.pool, id).await
    }

    pub async fn find_by_id_in_op(
        &self,
        op: &mut DbOp<'_>,
        id: AccountId,
    ) -> Result<Account, AccountError> {
        self.repo.find_by_id(op.as_executor(), id).await
    }

    pub async fn find_by_id_for_update_in_op(
        &self,
        op: &mut DbOp<'_>,
        id: AccountId,
    ) -> Result<Account, AccountError> {
        self.repo.find_by_id_for_update_in_op(op, id).await
    }

    pub(crate) async fn find_kind(&self, id: AccountId) -> Result<AccountKind, AccountError> {
        self.repo.find_kind(id).await
    }

    pub async fn find_status_in_op(
        &self,
        op: &mut DbOp<'_>,
        id: AccountId,
    ) -> Result<Status, AccountError> {
        self.repo.find_status_in_op(op, id).await
    }

    /// `None` when the account is closed. Missing accounts are also `None`.
    #[instrument(name = "bank_ledger.accounts.lock_unless_closed_in_op", skip(self, op), err)]
    pub async fn lock_unless_closed_in_op(
        &self,
        op: &mut DbOp<'_>,
        id: AccountId,
    ) -> Result<Option<Status>, AccountError> {
        self.repo.lock_unless_closed_in_op(op, id).await
    }

    #[instrument(name = "bank_ledger.accounts.update_status_in_op", skip(self, op), err)]
    pub async fn update_status_in_op(
        &self,
        op: &mut DbOp<'_>,
        id: AccountId,
        status: Status,
    ) -> Result<(), AccountError> {
        self.repo.update_status_in_op(op, id, status).await
    }

    #[instrument(name = "bank_ledger.accounts.update_balance_in_op", skip(self, op), err)]
    pub async fn update_balance_in_op(
        &self,
        op: &mut DbOp<'_>,
        id: AccountId,
        balance: Decimal,
    ) -> Result<(), AccountError> {
        self.repo.update_balance_in_op(op, id, balance).await
    }

    pub(crate) async fn update_accrual_in_op(
        &self,
        op: &mut DbOp<'_>,
        id: AccountId,
        balance: Decimal,
        accrued_through: DateTime<Utc>,
    ) -> Result<(), AccountError> {
        self.repo
            .update_accrual_in_op(op, id, balance, accrued_through)
            .await
    }

    #[instrument(name = "bank_ledger.accounts.remove_holders_in_op", skip(self, op), err)]
    pub async fn remove_holders_in_op(
        &self,
        op: &mut DbOp<'_>,
        account_id: AccountId,
    ) -> Result<u64, AccountError> {
        self.repo.remove_holders_in_op(op, account_id).await
    }

    /// One-shot snapshot of every active account.
    #[instrument(name = "bank_ledger.accounts.list_active", skip(self), err)]
    pub async fn list_active(&self) -> Result<Vec<Account>, AccountError> {
        self.repo.list_by_status(Status::Active).await
    }

    #[instrument(name = "bank_ledger.accounts.list_for_user", skip(self), err)]
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Account>, AccountError> {
        self.repo.list_for_user(user_id).await
    }
}
