//! Balance rules per account kind.
//!
//! Everything here is pure: callers load the account, look up the exchange
//! rate and persist whatever balance comes back.
pub mod error;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::{account::*, primitives::*};
use error::PolicyError;

/// Converts `amount` at `exchange_rate` and rounds to the minor unit of `to`.
/// `None` when the product does not fit a `Decimal`.
pub fn convert(amount: Decimal, exchange_rate: Decimal, to: Currency) -> Option<Decimal> {
    amount.checked_mul(exchange_rate).map(|converted| to.round(converted))
}

fn converted_amount(
    account: &Account,
    transaction: &Transaction,
    exchange_rate: Decimal,
) -> Result<Decimal, PolicyError> {
    convert(transaction.amount(), exchange_rate, account.currency())
        .ok_or(PolicyError::Overflow(account.id()))
}

/// Balance after withdrawing `transaction` from `account`.
pub fn apply_withdrawal(
    account: &Account,
    transaction: &Transaction,
    exchange_rate: Decimal,
) -> Result<Decimal, PolicyError> {
    ensure_active(account)?;
    let amount = converted_amount(account, transaction, exchange_rate)?;
    match account.policy() {
        AccountPolicy::Ordinary => ordinary_withdrawal(account, amount),
        AccountPolicy::Deposit { .. } => Err(PolicyError::WithdrawalNotPermitted(
            account.id(),
            AccountKind::Deposit,
        )),
        AccountPolicy::Credit {
            credit_rate,
            credit_limit,
        } => credit_withdrawal(account, amount, *credit_rate, *credit_limit),
    }
}

/// Balance after depositing `transaction` into `account`. Same rule for every kind.
pub fn apply_deposit(
    account: &Account,
    transaction: &Transaction,
    exchange_rate: Decimal,
) -> Result<Decimal, PolicyError> {
    ensure_active(account)?;
    let amount = converted_amount(account, transaction, exchange_rate)?;
    account
        .balance()
        .checked_add(amount)
        .ok_or(PolicyError::Overflow(account.id()))
}

fn ensure_active(account: &Account) -> Result<(), PolicyError> {
    if !account.is_active() {
        return Err(PolicyError::NonActiveAccount(
            account.id(),
            account.status(),
        ));
    }
    Ok(())
}

fn ordinary_withdrawal(account: &Account, amount: Decimal) -> Result<Decimal, PolicyError> {
    let balance = account
        .balance()
        .checked_sub(amount)
        .ok_or(PolicyError::Overflow(account.id()))?;
    if balance < Decimal::ZERO {
        return Err(PolicyError::InsufficientFunds(account.id(), balance));
    }
    Ok(balance)
}

// Interest is charged on every withdrawal, on the magnitude of the resulting balance.
fn credit_withdrawal(
    account: &Account,
    amount: Decimal,
    credit_rate: Decimal,
    credit_limit: Decimal,
) -> Result<Decimal, PolicyError> {
    let overflow = || PolicyError::Overflow(account.id());
    let candidate = account.balance().checked_sub(amount).ok_or_else(overflow)?;
    if candidate.abs() >= credit_limit {
        return Err(PolicyError::InsufficientFunds(account.id(), candidate));
    }
    let balance = candidate
        .abs()
        .checked_mul(credit_rate)
        .and_then(|interest| candidate.checked_sub(interest))
        .ok_or_else(overflow)?;
    // Stricter than the candidate check alone: keeps |balance| < limit once interest is added.
    if balance.abs() >= credit_limit {
        return Err(PolicyError::InsufficientFunds(account.id(), balance));
    }
    Ok(balance)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accrual {
    pub balance: Decimal,
    pub accrued_through: DateTime<Utc>,
    pub periods: i64,
}

/// Compounds deposit interest for every whole `update_period` (in days) elapsed
/// since the last accrual. Returns `None` when no full period has passed.
pub fn accrue_deposit_interest(
    account: &Account,
    now: DateTime<Utc>,
) -> Result<Option<Accrual>, PolicyError> {
    ensure_active(account)?;
    let AccountPolicy::Deposit {
        deposit_rate,
        update_period,
    } = account.policy()
    else {
        return Err(PolicyError::NotAccruing(account.id(), account.kind()));
    };
    let last_accrued_at = account.values().last_accrued_at;
    let periods = (now - last_accrued_at).num_days() / i64::from(*update_period);
    if periods <= 0 {
        return Ok(None);
    }
    let currency = account.currency();
    let balance = (0..periods)
        .try_fold(account.balance(), |balance, _| {
            balance
                .checked_mul(*deposit_rate)
                .and_then(|interest| balance.checked_add(interest))
                .map(|balance| currency.round(balance))
        })
        .ok_or(PolicyError::Overflow(account.id()))?;
    Ok(Some(Accrual {
        balance,
        accrued_through: last_accrued_at
            + chrono::Duration::days(periods * i64::from(*update_period)),
        periods,
    }))
}
