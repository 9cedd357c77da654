use chrono::NaiveDate;
use derive_builder::Builder;
use rust_decimal::Decimal;

pub use bank_types::{primitives::RequestId, request::*};

use crate::{
    account::{AccountPolicy, NewAccount, NewAccountBuilderError},
    primitives::*,
};

/// A user's request to have an account opened for them.
#[derive(Clone, Debug)]
pub struct Request {
    values: RequestValues,
}

impl Request {
    pub(super) fn new(values: RequestValues) -> Self {
        Self { values }
    }

    pub fn id(&self) -> RequestId {
        self.values.id
    }

    pub fn requester_id(&self) -> UserId {
        self.values.requester_id
    }

    pub fn kind(&self) -> AccountKind {
        self.values.kind()
    }

    pub fn is_considered(&self) -> bool {
        self.values.considered
    }

    /// The account exactly as it was requested.
    pub fn new_account(&self) -> Result<NewAccount, NewAccountBuilderError> {
        let mut builder = NewAccount::builder();
        builder
            .balance(self.values.balance)
            .currency(self.values.currency)
            .policy(self.values.policy.clone());
        if let Some(expires_end) = self.values.expires_end {
            builder.expires_end(expires_end);
        }
        builder.build()
    }

    pub fn values(&self) -> &RequestValues {
        &self.values
    }

    pub fn into_values(self) -> RequestValues {
        self.values
    }
}

#[derive(Builder, Debug, Clone)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct NewRequest {
    #[builder(setter(into))]
    pub(super) requester_id: UserId,
    pub(super) currency: Currency,
    #[builder(default)]
    pub(super) balance: Decimal,
    #[builder(setter(strip_option, into), default)]
    pub(super) expires_end: Option<NaiveDate>,
    #[builder(default = "AccountPolicy::Ordinary")]
    pub(super) policy: AccountPolicy,
}

impl NewRequest {
    pub fn builder() -> NewRequestBuilder {
        NewRequestBuilder::default()
    }

    pub fn kind(&self) -> AccountKind {
        self.policy.kind()
    }
}

impl NewRequestBuilder {
    fn validate(&self) -> Result<(), String> {
        self.policy
            .as_ref()
            .unwrap_or(&AccountPolicy::Ordinary)
            .validate_opening(self.balance.unwrap_or_default())
    }
}
