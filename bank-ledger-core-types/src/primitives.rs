use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

crate::entity_id! { AccountId }
crate::entity_id! { RequestId }
crate::entity_id! { UserId }
crate::entity_id! { InvoiceId }

#[derive(
    Debug,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    sqlx::Type,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[sqlx(type_name = "bank_currency", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Uah,
    Gbp,
    Eur,
}

impl Currency {
    /// Number of decimal places of the currency's minor unit.
    pub fn minor_units(&self) -> u32 {
        match self {
            Currency::Usd | Currency::Uah | Currency::Gbp | Currency::Eur => 2,
        }
    }

    pub fn round(&self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(self.minor_units(), RoundingStrategy::MidpointAwayFromZero)
    }
}

#[derive(
    Debug,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    sqlx::Type,
    strum::Display,
    strum::EnumString,
)]
#[sqlx(type_name = "bank_account_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Active,
    Blocked,
    Closed,
}

impl Default for Status {
    fn default() -> Self {
        Self::Active
    }
}

#[derive(
    Debug,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    sqlx::Type,
    strum::Display,
    strum::EnumString,
)]
#[sqlx(type_name = "bank_account_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AccountKind {
    Ordinary,
    Deposit,
    Credit,
}

#[derive(
    Debug,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    sqlx::Type,
    strum::Display,
    strum::EnumString,
)]
#[sqlx(type_name = "bank_permission", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    All,
    Payments,
    View,
}

impl Default for Permission {
    fn default() -> Self {
        Self::All
    }
}
