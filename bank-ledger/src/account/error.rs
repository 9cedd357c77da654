use thiserror::Error;

use bank_types::primitives::{AccountId, UserId};

#[derive(Error, Debug)]
pub enum AccountError {
    #[error("AccountError - Sqlx: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("AccountError - NotFound: id '{0}' not found")]
    NotFound(AccountId),
    #[error("AccountError - DuplicateHolder: user '{1}' already holds account '{0}'")]
    DuplicateHolder(AccountId, UserId),
    #[error("AccountError - MissingPolicyColumn: account '{0}' has no '{1}'")]
    MissingPolicyColumn(AccountId, &'static str),
}
