//! Applies transactions to account balances: single-account withdrawals and
//! deposits, account-to-account payments and invoice settlement.
pub mod error;

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use std::sync::Arc;

use crate::{
    account::Accounts,
    clock::ClockHandle,
    db_op::{DbOp, IsolationLevel},
    exchange::ExchangeRates,
    invoice::{error::InvoiceError, Invoices},
    policy::{self, Accrual},
    primitives::*,
};
use error::ProcessorError;

/// Balances of both parties after a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payment {
    pub payer_balance: Decimal,
    pub payee_balance: Decimal,
}

#[derive(Clone)]
pub struct TransactionProcessor {
    pool: PgPool,
    accounts: Accounts,
    invoices: Invoices,
    exchange_rates: Arc<dyn ExchangeRates>,
    clock: ClockHandle,
}

impl TransactionProcessor {
    pub(crate) fn new(
        pool: &PgPool,
        accounts: &Accounts,
        invoices: &Invoices,
        exchange_rates: Arc<dyn ExchangeRates>,
        clock: &ClockHandle,
    ) -> Self {
        Self {
            pool: pool.clone(),
            accounts: accounts.clone(),
            invoices: invoices.clone(),
            exchange_rates,
            clock: clock.clone(),
        }
    }

    // The credit limit check must not race a concurrent withdrawal.
    fn isolation_for(kind: AccountKind, direction: Direction) -> IsolationLevel {
        match (kind, direction) {
            (AccountKind::Credit, Direction::Withdraw) => IsolationLevel::RepeatableRead,
            _ => IsolationLevel::ReadCommitted,
        }
    }

    #[instrument(
        name = "bank_ledger.processor.process",
        skip(self, transaction),
        fields(amount = %transaction.amount(), currency = %transaction.currency()),
        err
    )]
    pub async fn process(
        &self,
        account_id: AccountId,
        transaction: &Transaction,
        direction: Direction,
    ) -> Result<Decimal, ProcessorError> {
        let kind = self.accounts.find_kind(account_id).await?;
        let mut op =
            DbOp::init(&self.pool, Self::isolation_for(kind, direction), &self.clock).await?;
        let account = self
            .accounts
            .find_by_id_for_update_in_op(&mut op, account_id)
            .await?;
        let rate = self
            .exchange_rates
            .rate(transaction.currency(), account.currency())
            .await?;
        let balance = match direction {
            Direction::Withdraw => policy::apply_withdrawal(&account, transaction, rate)?,
            Direction::Deposit => policy::apply_deposit(&account, transaction, rate)?,
        };
        self.accounts
            .update_balance_in_op(&mut op, account_id, balance)
            .await?;
        op.commit().await?;
        Ok(balance)
    }

    pub async fn withdraw(
        &self,
        account_id: AccountId,
        transaction: &Transaction,
    ) -> Result<Decimal, ProcessorError> {
        self.process(account_id, transaction, Direction::Withdraw).await
    }

    pub async fn deposit(
        &self,
        account_id: AccountId,
        transaction: &Transaction,
    ) -> Result<Decimal, ProcessorError> {
        self.process(account_id, transaction, Direction::Deposit).await
    }

    /// Withdraws from `payer` and deposits into `payee` in one op. Each side is
    /// converted into its own account's currency.
    #[instrument(
        name = "bank_ledger.processor.transfer",
        skip(self, transaction),
        fields(amount = %transaction.amount(), currency = %transaction.currency()),
        err
    )]
    pub async fn transfer(
        &self,
        payer: AccountId,
        payee: AccountId,
        transaction: &Transaction,
    ) -> Result<Payment, ProcessorError> {
        if payer == payee {
            return Err(ProcessorError::SelfTransfer(payer));
        }
        let kind = self.accounts.find_kind(payer).await?;
        let isolation = Self::isolation_for(kind, Direction::Withdraw);
        let mut op = DbOp::init(&self.pool, isolation, &self.clock).await?;
        let payment = self
            .transfer_in_op(&mut op, payer, payee, transaction)
            .await?;
        op.commit().await?;
        Ok(payment)
    }

    async fn transfer_in_op(
        &self,
        op: &mut DbOp<'_>,
        payer: AccountId,
        payee: AccountId,
        transaction: &Transaction,
    ) -> Result<Payment, ProcessorError> {
        // rows are always locked in id order so opposite payments cannot deadlock
        let (low, high) = if payer < payee {
            (payer, payee)
        } else {
            (payee, payer)
        };
        let low = self.accounts.find_by_id_for_update_in_op(op, low).await?;
        let high = self.accounts.find_by_id_for_update_in_op(op, high).await?;
        let (payer_account, payee_account) = if low.id() == payer {
            (low, high)
        } else {
            (high, low)
        };

        let payer_rate = self
            .exchange_rates
            .rate(transaction.currency(), payer_account.currency())
            .await?;
        let payee_rate = self
            .exchange_rates
            .rate(transaction.currency(), payee_account.currency())
            .await?;
        let payment = Payment {
            payer_balance: policy::apply_withdrawal(&payer_account, transaction, payer_rate)?,
            payee_balance: policy::apply_deposit(&payee_account, transaction, payee_rate)?,
        };
        self.accounts
            .update_balance_in_op(op, payer, payment.payer_balance)
            .await?;
        self.accounts
            .update_balance_in_op(op, payee, payment.payee_balance)
            .await?;
        Ok(payment)
    }

    /// Pays an invoice from its payer to its requester and marks it paid.
    #[instrument(name = "bank_ledger.processor.complete_invoice", skip(self), err)]
    pub async fn complete_invoice(&self, invoice_id: InvoiceId) -> Result<Payment, ProcessorError> {
        let res: Result<Payment, ProcessorError> = async {
            let mut op =
                DbOp::init(&self.pool, IsolationLevel::RepeatableRead, &self.clock).await?;
            let invoice = self
                .invoices
                .find_for_update_in_op(&mut op, invoice_id)
                .await?;
            if invoice.is_paid() {
                return Err(InvoiceError::AlreadyPaid(invoice_id).into());
            }
            let transaction = Transaction::new(invoice.amount(), invoice.currency(), op.now())
                .map_err(policy::error::PolicyError::from)?;
            let payment = self
                .transfer_in_op(
                    &mut op,
                    invoice.payer_id(),
                    invoice.requester_id(),
                    &transaction,
                )
                .await?;
            self.invoices.mark_paid_in_op(&mut op, invoice_id).await?;
            op.commit().await?;
            Ok(payment)
        }
        .await;
        match res {
            Err(e) if e.is_serialization_failure() => {
                if self.invoices.find_by_id(invoice_id).await?.is_paid() {
                    return Err(InvoiceError::AlreadyPaid(invoice_id).into());
                }
                Err(e)
            }
            res => res,
        }
    }

    /// Compounds any deposit interest that is due. `None` if no period has elapsed.
    #[instrument(name = "bank_ledger.processor.accrue_deposit_interest", skip(self), err)]
    pub async fn accrue_deposit_interest(
        &self,
        account_id: AccountId,
    ) -> Result<Option<Accrual>, ProcessorError> {
        let mut op = DbOp::init(&self.pool, IsolationLevel::RepeatableRead, &self.clock).await?;
        let account = self
            .accounts
            .find_by_id_for_update_in_op(&mut op, account_id)
            .await?;
        let accrual = policy::accrue_deposit_interest(&account, op.now())?;
        if let Some(accrual) = accrual.as_ref() {
            self.accounts
                .update_accrual_in_op(&mut op, account_id, accrual.balance, accrual.accrued_through)
                .await?;
        }
        op.commit().await?;
        Ok(accrual)
    }
}
