use thiserror::Error;

use crate::{
    account::error::AccountError, db_op::is_serialization_failure,
    exchange::error::ExchangeError, invoice::error::InvoiceError, policy::error::PolicyError,
    primitives::AccountId,
};

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("ProcessorError - Sqlx: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("ProcessorError - AccountError: {0}")]
    AccountError(#[from] AccountError),
    #[error("ProcessorError - InvoiceError: {0}")]
    InvoiceError(#[from] InvoiceError),
    #[error("ProcessorError - PolicyError: {0}")]
    PolicyError(#[from] PolicyError),
    #[error("ProcessorError - ExchangeError: {0}")]
    ExchangeError(#[from] ExchangeError),
    #[error("ProcessorError - SelfTransfer: account '{0}' cannot pay itself")]
    SelfTransfer(AccountId),
}

impl ProcessorError {
    pub fn is_serialization_failure(&self) -> bool {
        match self {
            Self::Sqlx(e)
            | Self::AccountError(AccountError::Sqlx(e))
            | Self::InvoiceError(InvoiceError::Sqlx(e)) => is_serialization_failure(e),
            _ => false,
        }
    }
}
