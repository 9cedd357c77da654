//! [Invoice]s one account raises against another, and their one-way `paid` flag.
mod entity;
pub mod error;
mod repo;

use sqlx::PgPool;
use tracing::instrument;

use crate::{clock::ClockHandle, db_op::DbOp, primitives::*};

pub use entity::*;
use error::*;
use repo::*;

#[derive(Clone)]
pub struct Invoices {
    repo: InvoiceRepo,
    pool: PgPool,
    clock: ClockHandle,
}

impl Invoices {
    pub(crate) fn new(pool: &PgPool, clock: &ClockHandle) -> Self {
        Self {
            repo: InvoiceRepo::new(pool),
            pool: pool.clone(),
            clock: clock.clone(),
        }
    }

    #[instrument(name = "bank_ledger.invoices.create", skip(self), err)]
    pub async fn create(&self, new_invoice: NewInvoice) -> Result<Invoice, InvoiceError> {
        self.repo
            .create(&self.pool, &new_invoice, self.clock.now())
            .await
    }

    #[instrument(name = "bank_ledger.invoices.find_by_id", skip(self), err)]
    pub async fn find_by_id(&self, id: InvoiceId) -> Result<Invoice, InvoiceError> {
        self.repo.find_by_id(id).await
    }

    pub async fn find_for_update_in_op(
        &self,
        op: &mut DbOp<'_>,
        id: InvoiceId,
    ) -> Result<Invoice, InvoiceError> {
        self.repo.find_for_update_in_op(op, id).await
    }

    #[instrument(name = "bank_ledger.invoices.mark_paid_in_op", skip(self, op), err)]
    pub async fn mark_paid_in_op(&self, op: &mut DbOp<'_>, id: InvoiceId) -> Result<(), InvoiceError> {
        self.repo.mark_paid_in_op(op, id).await
    }

    /// Invoices where the account is either the requester or the payer.
    #[instrument(name = "bank_ledger.invoices.list_for_account", skip(self), err)]
    pub async fn list_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Invoice>, InvoiceError> {
        self.repo.list_for_account(account_id).await
    }
}
