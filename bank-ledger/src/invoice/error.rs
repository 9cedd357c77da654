use thiserror::Error;

use bank_types::primitives::{AccountId, InvoiceId};

#[derive(Error, Debug)]
pub enum InvoiceError {
    #[error("InvoiceError - Sqlx: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("InvoiceError - NotFound: id '{0}' not found")]
    NotFound(InvoiceId),
    #[error("InvoiceError - AccountNotFound: account '{0}' not found")]
    AccountNotFound(AccountId),
    #[error("InvoiceError - AlreadyPaid: invoice '{0}' has already been paid")]
    AlreadyPaid(InvoiceId),
}
