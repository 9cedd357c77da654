use rust_decimal::Decimal;
use thiserror::Error;

use bank_types::primitives::{AccountId, AccountKind, Status};

#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("PolicyError - Validation: {0}")]
    Validation(String),
    #[error("PolicyError - NonActiveAccount: account '{0}' is {1}")]
    NonActiveAccount(AccountId, Status),
    #[error("PolicyError - InsufficientFunds: account '{0}' cannot reach balance {1}")]
    InsufficientFunds(AccountId, Decimal),
    #[error("PolicyError - WithdrawalNotPermitted: {1} account '{0}' does not allow withdrawals")]
    WithdrawalNotPermitted(AccountId, AccountKind),
    #[error("PolicyError - NotAccruing: {1} account '{0}' does not accrue deposit interest")]
    NotAccruing(AccountId, AccountKind),
    #[error("PolicyError - Overflow: balance of account '{0}' is out of range")]
    Overflow(AccountId),
}

impl From<bank_types::transaction::InvalidTransaction> for PolicyError {
    fn from(e: bank_types::transaction::InvalidTransaction) -> Self {
        Self::Validation(e.to_string())
    }
}
