use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::primitives::Currency;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Direction {
    Withdraw,
    Deposit,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum InvalidTransaction {
    #[error("Transaction amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),
}

/// A monetary movement against a single account.
///
/// The currency may differ from the account's; it is converted on application.
#[derive(Clone, Debug, Serialize)]
pub struct Transaction {
    amount: Decimal,
    currency: Currency,
    timestamp: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        amount: Decimal,
        currency: Currency,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, InvalidTransaction> {
        if amount <= Decimal::ZERO {
            return Err(InvalidTransaction::NonPositiveAmount(amount));
        }
        Ok(Self {
            amount,
            currency,
            timestamp,
        })
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn rejects_non_positive_amounts() {
        let now = Utc::now();
        assert_eq!(
            Transaction::new(dec!(0), Currency::Usd, now).unwrap_err(),
            InvalidTransaction::NonPositiveAmount(dec!(0))
        );
        assert!(Transaction::new(dec!(-1.5), Currency::Usd, now).is_err());
        let tx = Transaction::new(dec!(12.50), Currency::Eur, now).unwrap();
        assert_eq!(tx.amount(), dec!(12.50));
        assert_eq!(tx.currency(), Currency::Eur);
    }
}
