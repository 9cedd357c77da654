use thiserror::Error;

use crate::{
    account::error::AccountError, exchange::error::ExchangeError,
    invoice::error::InvoiceError, lifecycle::error::LifecycleError, policy::error::PolicyError,
    processor::error::ProcessorError, request::error::RequestError,
};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("LedgerError - Sqlx: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("LedgerError - Migrate: {0}")]
    SqlxMigrate(#[from] sqlx::migrate::MigrateError),
    #[error("LedgerError - Config: {0}")]
    ConfigError(String),
    #[error("LedgerError - AccountError: {0}")]
    AccountError(#[from] AccountError),
    #[error("LedgerError - RequestError: {0}")]
    RequestError(#[from] RequestError),
    #[error("LedgerError - InvoiceError: {0}")]
    InvoiceError(#[from] InvoiceError),
    #[error("LedgerError - LifecycleError: {0}")]
    LifecycleError(#[from] LifecycleError),
    #[error("LedgerError - ProcessorError: {0}")]
    ProcessorError(#[from] ProcessorError),
    #[error("LedgerError - PolicyError: {0}")]
    PolicyError(#[from] PolicyError),
    #[error("LedgerError - ExchangeError: {0}")]
    ExchangeError(#[from] ExchangeError),
}

/// Flat classification of a [LedgerError], one per failure a caller can act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    NonActiveAccount,
    InsufficientFunds,
    AlreadyConsidered,
    AlreadyPaid,
    AlreadyClosed,
    ActiveAccount,
    DuplicateHolder,
    ExchangeUnavailable,
    Persistence,
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Sqlx(_) | Self::SqlxMigrate(_) => ErrorKind::Persistence,
            Self::ConfigError(_) => ErrorKind::Validation,
            Self::AccountError(e) => account_kind(e),
            Self::RequestError(e) => request_kind(e),
            Self::InvoiceError(e) => invoice_kind(e),
            Self::LifecycleError(e) => match e {
                LifecycleError::Sqlx(_) => ErrorKind::Persistence,
                LifecycleError::AccountError(e) => account_kind(e),
                LifecycleError::RequestError(e) => request_kind(e),
                LifecycleError::AlreadyClosed(_) => ErrorKind::AlreadyClosed,
                LifecycleError::ActiveAccount(_, _) => ErrorKind::ActiveAccount,
                LifecycleError::InvalidSnapshot(_, _) => ErrorKind::Validation,
            },
            Self::ProcessorError(e) => match e {
                ProcessorError::Sqlx(_) => ErrorKind::Persistence,
                ProcessorError::AccountError(e) => account_kind(e),
                ProcessorError::InvoiceError(e) => invoice_kind(e),
                ProcessorError::PolicyError(e) => policy_kind(e),
                ProcessorError::ExchangeError(e) => exchange_kind(e),
                ProcessorError::SelfTransfer(_) => ErrorKind::Validation,
            },
            Self::PolicyError(e) => policy_kind(e),
            Self::ExchangeError(e) => exchange_kind(e),
        }
    }
}

fn account_kind(e: &AccountError) -> ErrorKind {
    match e {
        AccountError::Sqlx(_) | AccountError::MissingPolicyColumn(_, _) => ErrorKind::Persistence,
        AccountError::NotFound(_) => ErrorKind::NotFound,
        AccountError::DuplicateHolder(_, _) => ErrorKind::DuplicateHolder,
    }
}

fn request_kind(e: &RequestError) -> ErrorKind {
    match e {
        RequestError::Sqlx(_) | RequestError::MissingPolicyColumn(_, _) => ErrorKind::Persistence,
        RequestError::NotFound(_) => ErrorKind::NotFound,
        RequestError::AlreadyConsidered(_) => ErrorKind::AlreadyConsidered,
    }
}

fn invoice_kind(e: &InvoiceError) -> ErrorKind {
    match e {
        InvoiceError::Sqlx(_) => ErrorKind::Persistence,
        InvoiceError::NotFound(_) | InvoiceError::AccountNotFound(_) => ErrorKind::NotFound,
        InvoiceError::AlreadyPaid(_) => ErrorKind::AlreadyPaid,
    }
}

fn policy_kind(e: &PolicyError) -> ErrorKind {
    match e {
        PolicyError::Validation(_)
        | PolicyError::WithdrawalNotPermitted(_, _)
        | PolicyError::NotAccruing(_, _)
        | PolicyError::Overflow(_) => ErrorKind::Validation,
        PolicyError::NonActiveAccount(_, _) => ErrorKind::NonActiveAccount,
        PolicyError::InsufficientFunds(_, _) => ErrorKind::InsufficientFunds,
    }
}

fn exchange_kind(e: &ExchangeError) -> ErrorKind {
    match e {
        ExchangeError::Unavailable(_, _) => ErrorKind::ExchangeUnavailable,
        ExchangeError::NonPositiveRate(_, _) => ErrorKind::Validation,
    }
}
