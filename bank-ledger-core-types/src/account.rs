use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::primitives::*;

/// Variant specific parameters of an account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccountPolicy {
    Ordinary,
    Deposit {
        deposit_rate: Decimal,
        /// Accrual interval in days.
        update_period: i32,
    },
    Credit {
        credit_rate: Decimal,
        credit_limit: Decimal,
    },
}

/// The nullable per-kind columns a policy is stored in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PolicyColumns {
    pub deposit_rate: Option<Decimal>,
    pub update_period: Option<i32>,
    pub credit_rate: Option<Decimal>,
    pub credit_limit: Option<Decimal>,
}

impl AccountPolicy {
    pub fn kind(&self) -> AccountKind {
        match self {
            AccountPolicy::Ordinary => AccountKind::Ordinary,
            AccountPolicy::Deposit { .. } => AccountKind::Deposit,
            AccountPolicy::Credit { .. } => AccountKind::Credit,
        }
    }

    /// Rebuilds a policy from its kind and columns. The error names the missing column.
    pub fn from_columns(kind: AccountKind, columns: PolicyColumns) -> Result<Self, &'static str> {
        Ok(match kind {
            AccountKind::Ordinary => AccountPolicy::Ordinary,
            AccountKind::Deposit => AccountPolicy::Deposit {
                deposit_rate: columns.deposit_rate.ok_or("deposit_rate")?,
                update_period: columns.update_period.ok_or("update_period")?,
            },
            AccountKind::Credit => AccountPolicy::Credit {
                credit_rate: columns.credit_rate.ok_or("credit_rate")?,
                credit_limit: columns.credit_limit.ok_or("credit_limit")?,
            },
        })
    }

    pub fn columns(&self) -> PolicyColumns {
        match self {
            AccountPolicy::Ordinary => PolicyColumns::default(),
            AccountPolicy::Deposit {
                deposit_rate,
                update_period,
            } => PolicyColumns {
                deposit_rate: Some(*deposit_rate),
                update_period: Some(*update_period),
                ..Default::default()
            },
            AccountPolicy::Credit {
                credit_rate,
                credit_limit,
            } => PolicyColumns {
                credit_rate: Some(*credit_rate),
                credit_limit: Some(*credit_limit),
                ..Default::default()
            },
        }
    }

    /// Checks the policy parameters together with the balance an account would open with.
    pub fn validate_opening(&self, balance: Decimal) -> Result<(), String> {
        match self {
            AccountPolicy::Ordinary => {
                if balance < Decimal::ZERO {
                    return Err("Ordinary account balance must not be negative".to_string());
                }
            }
            AccountPolicy::Deposit {
                deposit_rate,
                update_period,
            } => {
                if balance < Decimal::ZERO {
                    return Err("Deposit account balance must not be negative".to_string());
                }
                if *deposit_rate < Decimal::ZERO {
                    return Err("Deposit rate must not be negative".to_string());
                }
                if *update_period <= 0 {
                    return Err("Update period must be at least one day".to_string());
                }
            }
            AccountPolicy::Credit {
                credit_rate,
                credit_limit,
            } => {
                if *credit_limit < Decimal::ZERO {
                    return Err("Credit limit must not be negative".to_string());
                }
                if *credit_rate < Decimal::ZERO {
                    return Err("Credit rate must not be negative".to_string());
                }
                if balance < Decimal::ZERO && balance.abs() >= *credit_limit {
                    return Err("Opening balance exceeds the credit limit".to_string());
                }
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccountValues {
    pub id: AccountId,
    pub balance: Decimal,
    pub currency: Currency,
    pub expires_end: Option<NaiveDate>,
    pub status: Status,
    pub holders: Vec<UserId>,
    pub policy: AccountPolicy,
    pub last_accrued_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl AccountValues {
    /// True once `today` is past `expires_end`. Accounts without an end never expire.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expires_end
            .map(|expires_end| today > expires_end)
            .unwrap_or(false)
    }
}
