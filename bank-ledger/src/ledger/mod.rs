pub mod config;
pub mod error;

use rust_decimal::Decimal;
use sqlx::PgPool;
pub use tracing::instrument;

pub use config::*;
use error::*;

use crate::{
    account::{Account, Accounts, NewAccount},
    clock::ClockHandle,
    invoice::{Invoice, Invoices, NewInvoice},
    lifecycle::AccountLifecycle,
    policy::Accrual,
    primitives::*,
    processor::{Payment, TransactionProcessor},
    request::{NewRequest, Request, Requests},
};

#[derive(Clone)]
pub struct BankLedger {
    pool: PgPool,
    clock: ClockHandle,
    accounts: Accounts,
    requests: Requests,
    invoices: Invoices,
    lifecycle: AccountLifecycle,
    processor: TransactionProcessor,
}

impl BankLedger {
    pub async fn init(config: BankLedgerConfig) -> Result<Self, LedgerError> {
        let pool = match (config.pool, config.pg_con) {
            (Some(pool), None) => pool,
            (None, Some(pg_con)) => {
                let mut pool_opts = sqlx::postgres::PgPoolOptions::new();
                if let Some(max_connections) = config.max_connections {
                    pool_opts = pool_opts.max_connections(max_connections);
                }
                pool_opts.connect(&pg_con).await?
            }
            _ => {
                return Err(LedgerError::ConfigError(
                    "One of pg_con or pool must be set".to_string(),
                ))
            }
        };
        if config.exec_migrations {
            sqlx::migrate!().run(&pool).await?;
        }

        let clock = config.clock;
        let accounts = Accounts::new(&pool);
        let requests = Requests::new(&pool, &clock);
        let invoices = Invoices::new(&pool, &clock);
        let lifecycle = AccountLifecycle::new(&pool, &accounts, &requests, &clock);
        let processor = TransactionProcessor::new(
            &pool,
            &accounts,
            &invoices,
            config.exchange_rates,
            &clock,
        );
        Ok(Self {
            pool,
            clock,
            accounts,
            requests,
            invoices,
            lifecycle,
            processor,
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn clock(&self) -> &ClockHandle {
        &self.clock
    }

    pub fn accounts(&self) -> &Accounts {
        &self.accounts
    }

    pub fn requests(&self) -> &Requests {
        &self.requests
    }

    pub fn invoices(&self) -> &Invoices {
        &self.invoices
    }

    pub fn lifecycle(&self) -> &AccountLifecycle {
        &self.lifecycle
    }

    pub fn processor(&self) -> &TransactionProcessor {
        &self.processor
    }

    pub async fn open_account(
        &self,
        user_id: UserId,
        new_account: NewAccount,
    ) -> Result<AccountId, LedgerError> {
        Ok(self.lifecycle.open_account(user_id, new_account).await?)
    }

    pub async fn request_opening(&self, new_request: NewRequest) -> Result<Request, LedgerError> {
        Ok(self.requests.create(new_request).await?)
    }

    pub async fn complete_opening_request(
        &self,
        request_id: RequestId,
        new_account: NewAccount,
    ) -> Result<AccountId, LedgerError> {
        Ok(self
            .lifecycle
            .complete_opening_request(request_id, new_account)
            .await?)
    }

    /// Opens the account stored in the request, as requested.
    pub async fn approve_opening_request(
        &self,
        request_id: RequestId,
    ) -> Result<AccountId, LedgerError> {
        Ok(self.lifecycle.approve_opening_request(request_id).await?)
    }

    pub async fn reject_opening_request(&self, request_id: RequestId) -> Result<(), LedgerError> {
        Ok(self.lifecycle.reject_opening_request(request_id).await?)
    }

    pub async fn block_account(&self, account_id: AccountId) -> Result<(), LedgerError> {
        Ok(self.lifecycle.block_account(account_id).await?)
    }

    pub async fn close_account(&self, account_id: AccountId) -> Result<(), LedgerError> {
        Ok(self.lifecycle.close_account(account_id).await?)
    }

    pub async fn account_force_closing(&self, account_id: AccountId) -> Result<(), LedgerError> {
        Ok(self.lifecycle.account_force_closing(account_id).await?)
    }

    pub async fn add_holder(
        &self,
        account_id: AccountId,
        holder_id: UserId,
    ) -> Result<(), LedgerError> {
        Ok(self.lifecycle.add_holder(account_id, holder_id).await?)
    }

    pub async fn get_account(&self, account_id: AccountId) -> Result<Account, LedgerError> {
        Ok(self.accounts.find_by_id(account_id).await?)
    }

    pub async fn get_user_accounts(&self, user_id: UserId) -> Result<Vec<Account>, LedgerError> {
        Ok(self.accounts.list_for_user(user_id).await?)
    }

    pub async fn get_active_accounts(&self) -> Result<Vec<Account>, LedgerError> {
        Ok(self.accounts.list_active().await?)
    }

    #[instrument(name = "bank_ledger.withdraw", skip(self, transaction), err)]
    pub async fn withdraw(
        &self,
        account_id: AccountId,
        transaction: &Transaction,
    ) -> Result<Decimal, LedgerError> {
        Ok(self.processor.withdraw(account_id, transaction).await?)
    }

    #[instrument(name = "bank_ledger.deposit", skip(self, transaction), err)]
    pub async fn deposit(
        &self,
        account_id: AccountId,
        transaction: &Transaction,
    ) -> Result<Decimal, LedgerError> {
        Ok(self.processor.deposit(account_id, transaction).await?)
    }

    #[instrument(name = "bank_ledger.transfer", skip(self, transaction), err)]
    pub async fn transfer(
        &self,
        payer: AccountId,
        payee: AccountId,
        transaction: &Transaction,
    ) -> Result<Payment, LedgerError> {
        Ok(self.processor.transfer(payer, payee, transaction).await?)
    }

    pub async fn create_invoice(&self, new_invoice: NewInvoice) -> Result<Invoice, LedgerError> {
        Ok(self.invoices.create(new_invoice).await?)
    }

    pub async fn get_invoice(&self, invoice_id: InvoiceId) -> Result<Invoice, LedgerError> {
        Ok(self.invoices.find_by_id(invoice_id).await?)
    }

    pub async fn get_account_invoices(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Invoice>, LedgerError> {
        Ok(self.invoices.list_for_account(account_id).await?)
    }

    pub async fn complete_invoice(&self, invoice_id: InvoiceId) -> Result<Payment, LedgerError> {
        Ok(self.processor.complete_invoice(invoice_id).await?)
    }

    pub async fn accrue_deposit_interest(
        &self,
        account_id: AccountId,
    ) -> Result<Option<Accrual>, LedgerError> {
        Ok(self.processor.accrue_deposit_interest(account_id).await?)
    }
}
