use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    account::error::AccountError,
    db_op::is_serialization_failure,
    primitives::{AccountId, RequestId},
    request::error::RequestError,
};

#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("LifecycleError - Sqlx: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("LifecycleError - AccountError: {0}")]
    AccountError(#[from] AccountError),
    #[error("LifecycleError - RequestError: {0}")]
    RequestError(#[from] RequestError),
    #[error("LifecycleError - AlreadyClosed: account '{0}' is closed")]
    AlreadyClosed(AccountId),
    #[error("LifecycleError - ActiveAccount: account '{0}' still holds {1}")]
    ActiveAccount(AccountId, Decimal),
    #[error("LifecycleError - InvalidSnapshot: request '{0}' does not describe an account: {1}")]
    InvalidSnapshot(RequestId, String),
}

impl LifecycleError {
    pub fn is_serialization_failure(&self) -> bool {
        match self {
            Self::Sqlx(e)
            | Self::AccountError(AccountError::Sqlx(e))
            | Self::RequestError(RequestError::Sqlx(e)) => is_serialization_failure(e),
            _ => false,
        }
    }
}
