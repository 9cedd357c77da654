use chrono::NaiveDate;
use derive_builder::Builder;
use rust_decimal::Decimal;

pub use bank_types::{account::*, primitives::AccountId};

use crate::primitives::*;

/// A persisted account together with its current holders.
#[derive(Clone, Debug)]
pub struct Account {
    values: AccountValues,
}

impl Account {
    pub(crate) fn new(values: AccountValues) -> Self {
        Self { values }
    }

    pub fn id(&self) -> AccountId {
        self.values.id
    }

    pub fn values(&self) -> &AccountValues {
        &self.values
    }

    pub fn into_values(self) -> AccountValues {
        self.values
    }

    pub fn balance(&self) -> Decimal {
        self.values.balance
    }

    pub fn currency(&self) -> Currency {
        self.values.currency
    }

    pub fn status(&self) -> Status {
        self.values.status
    }

    pub fn kind(&self) -> AccountKind {
        self.values.policy.kind()
    }

    pub fn policy(&self) -> &AccountPolicy {
        &self.values.policy
    }

    pub fn holders(&self) -> &[UserId] {
        &self.values.holders
    }

    pub fn is_active(&self) -> bool {
        self.values.status == Status::Active
    }

    /// True once `today` is past the account's `expires_end`.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.values.is_expired(today)
    }
}

/// Representation of a ***new*** account with its validated opening parameters.
#[derive(Builder, Debug, Clone)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct NewAccount {
    #[builder(default)]
    pub(super) balance: Decimal,
    pub(super) currency: Currency,
    #[builder(setter(strip_option, into), default)]
    pub(super) expires_end: Option<NaiveDate>,
    #[builder(default)]
    pub(super) status: Status,
    #[builder(default = "AccountPolicy::Ordinary")]
    pub(super) policy: AccountPolicy,
}

impl NewAccount {
    pub fn builder() -> NewAccountBuilder {
        NewAccountBuilder::default()
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn kind(&self) -> AccountKind {
        self.policy.kind()
    }
}

impl NewAccountBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.status == Some(Status::Closed) {
            return Err("A new account cannot be closed".to_string());
        }
        self.policy
            .as_ref()
            .unwrap_or(&AccountPolicy::Ordinary)
            .validate_opening(self.balance.unwrap_or_default())
    }
}
