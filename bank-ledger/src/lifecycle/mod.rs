//! Multi-step account workflows, each committed or rolled back as a whole.
//!
//! `ACTIVE -> BLOCKED -> CLOSED`, with `ACTIVE -> CLOSED` only through a
//! zero-balance close or a force close. Nothing leaves `CLOSED`.
pub mod error;

use sqlx::PgPool;
use tracing::instrument;

use crate::{
    account::{Accounts, NewAccount},
    clock::ClockHandle,
    db_op::{DbOp, IsolationLevel},
    primitives::*,
    request::{error::RequestError, Requests},
};
use error::LifecycleError;

#[derive(Clone)]
pub struct AccountLifecycle {
    pool: PgPool,
    accounts: Accounts,
    requests: Requests,
    clock: ClockHandle,
}

impl AccountLifecycle {
    pub(crate) fn new(
        pool: &PgPool,
        accounts: &Accounts,
        requests: &Requests,
        clock: &ClockHandle,
    ) -> Self {
        Self {
            pool: pool.clone(),
            accounts: accounts.clone(),
            requests: requests.clone(),
            clock: clock.clone(),
        }
    }

    async fn begin(&self, isolation: IsolationLevel) -> Result<DbOp<'static>, LifecycleError> {
        Ok(DbOp::init(&self.pool, isolation, &self.clock).await?)
    }

    #[instrument(name = "bank_ledger.lifecycle.open_account", skip(self), err)]
    pub async fn open_account(
        &self,
        user_id: UserId,
        new_account: NewAccount,
    ) -> Result<AccountId, LifecycleError> {
        let mut op = self.begin(IsolationLevel::ReadCommitted).await?;
        let account_id = self.accounts.create_in_op(&mut op, &new_account).await?;
        self.accounts
            .add_holder_in_op(&mut op, account_id, user_id, Permission::All)
            .await?;
        op.commit().await?;
        Ok(account_id)
    }

    #[instrument(name = "bank_ledger.lifecycle.complete_opening_request", skip(self), err)]
    pub async fn complete_opening_request(
        &self,
        request_id: RequestId,
        new_account: NewAccount,
    ) -> Result<AccountId, LifecycleError> {
        let res = self.fulfil_request(request_id, Some(&new_account)).await;
        self.considered_on_conflict(request_id, res).await
    }

    /// Fulfils a request with the account stored in it.
    #[instrument(name = "bank_ledger.lifecycle.approve_opening_request", skip(self), err)]
    pub async fn approve_opening_request(
        &self,
        request_id: RequestId,
    ) -> Result<AccountId, LifecycleError> {
        let res = self.fulfil_request(request_id, None).await;
        self.considered_on_conflict(request_id, res).await
    }

    async fn fulfil_request(
        &self,
        request_id: RequestId,
        new_account: Option<&NewAccount>,
    ) -> Result<AccountId, LifecycleError> {
        let mut op = self.begin(IsolationLevel::RepeatableRead).await?;
        let request = self
            .requests
            .find_for_update_in_op(&mut op, request_id)
            .await?;
        if request.is_considered() {
            return Err(RequestError::AlreadyConsidered(request_id).into());
        }
        let requested;
        let new_account = match new_account {
            Some(new_account) => new_account,
            None => {
                requested = request
                    .new_account()
                    .map_err(|e| LifecycleError::InvalidSnapshot(request_id, e.to_string()))?;
                &requested
            }
        };
        let account_id = self.accounts.create_in_op(&mut op, new_account).await?;
        self.accounts
            .add_holder_in_op(&mut op, account_id, request.requester_id(), Permission::All)
            .await?;
        self.requests.mark_considered_in_op(&mut op, request_id).await?;
        op.commit().await?;
        Ok(account_id)
    }

    #[instrument(name = "bank_ledger.lifecycle.reject_opening_request", skip(self), err)]
    pub async fn reject_opening_request(
        &self,
        request_id: RequestId,
    ) -> Result<(), LifecycleError> {
        let res: Result<(), LifecycleError> = async {
            let mut op = self.begin(IsolationLevel::RepeatableRead).await?;
            let request = self
                .requests
                .find_for_update_in_op(&mut op, request_id)
                .await?;
            if request.is_considered() {
                return Err(RequestError::AlreadyConsidered(request_id).into());
            }
            self.requests.mark_considered_in_op(&mut op, request_id).await?;
            op.commit().await?;
            Ok(())
        }
        .await;
        self.considered_on_conflict(request_id, res).await
    }

    // A repeatable read op that loses the request row to a concurrent one aborts
    // with a serialization failure. Callers see it as the request being considered.
    async fn considered_on_conflict<T>(
        &self,
        request_id: RequestId,
        res: Result<T, LifecycleError>,
    ) -> Result<T, LifecycleError> {
        match res {
            Err(e) if e.is_serialization_failure() => {
                if self.requests.find_by_id(request_id).await?.is_considered() {
                    return Err(RequestError::AlreadyConsidered(request_id).into());
                }
                Err(e)
            }
            res => res,
        }
    }

    async fn lock_unless_closed(
        &self,
        op: &mut DbOp<'_>,
        account_id: AccountId,
    ) -> Result<Status, LifecycleError> {
        match self.accounts.lock_unless_closed_in_op(op, account_id).await? {
            Some(status) => Ok(status),
            None => {
                self.accounts.find_status_in_op(op, account_id).await?;
                Err(LifecycleError::AlreadyClosed(account_id))
            }
        }
    }

    /// Re-blocking a blocked account is allowed.
    #[instrument(name = "bank_ledger.lifecycle.block_account", skip(self), err)]
    pub async fn block_account(&self, account_id: AccountId) -> Result<(), LifecycleError> {
        let mut op = self.begin(IsolationLevel::ReadCommitted).await?;
        self.lock_unless_closed(&mut op, account_id).await?;
        self.accounts
            .update_status_in_op(&mut op, account_id, Status::Blocked)
            .await?;
        op.commit().await?;
        Ok(())
    }

    #[instrument(name = "bank_ledger.lifecycle.close_account", skip(self), err)]
    pub async fn close_account(&self, account_id: AccountId) -> Result<(), LifecycleError> {
        let mut op = self.begin(IsolationLevel::Serializable).await?;
        let account = self
            .accounts
            .find_by_id_for_update_in_op(&mut op, account_id)
            .await?;
        if account.status() == Status::Closed {
            return Err(LifecycleError::AlreadyClosed(account_id));
        }
        if !account.balance().is_zero() {
            return Err(LifecycleError::ActiveAccount(account_id, account.balance()));
        }
        self.accounts
            .update_status_in_op(&mut op, account_id, Status::Closed)
            .await?;
        self.accounts.remove_holders_in_op(&mut op, account_id).await?;
        op.commit().await?;
        Ok(())
    }

    /// Closes regardless of balance, writing whatever remains off to zero.
    #[instrument(
        name = "bank_ledger.lifecycle.account_force_closing",
        skip(self),
        fields(n_holders_removed),
        err
    )]
    pub async fn account_force_closing(
        &self,
        account_id: AccountId,
    ) -> Result<(), LifecycleError> {
        let mut op = self.begin(IsolationLevel::Serializable).await?;
        self.accounts
            .find_by_id_for_update_in_op(&mut op, account_id)
            .await?;
        self.accounts
            .update_status_in_op(&mut op, account_id, Status::Closed)
            .await?;
        self.accounts
            .update_balance_in_op(&mut op, account_id, rust_decimal::Decimal::ZERO)
            .await?;
        let removed = self
            .accounts
            .remove_holders_in_op(&mut op, account_id)
            .await?;
        tracing::Span::current().record("n_holders_removed", removed);
        op.commit().await?;
        Ok(())
    }

    #[instrument(name = "bank_ledger.lifecycle.add_holder", skip(self), err)]
    pub async fn add_holder(
        &self,
        account_id: AccountId,
        holder_id: UserId,
    ) -> Result<(), LifecycleError> {
        let mut op = self.begin(IsolationLevel::ReadCommitted).await?;
        self.lock_unless_closed(&mut op, account_id).await?;
        self.accounts
            .add_holder_in_op(&mut op, account_id, holder_id, Permission::All)
            .await?;
        op.commit().await?;
        Ok(())
    }
}
