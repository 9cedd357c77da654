use derive_builder::Builder;
use rust_decimal::Decimal;

pub use bank_types::{invoice::*, primitives::InvoiceId};

use crate::primitives::*;

/// A request for payment from one account to another.
#[derive(Clone, Debug)]
pub struct Invoice {
    values: InvoiceValues,
}

impl Invoice {
    pub(super) fn new(values: InvoiceValues) -> Self {
        Self { values }
    }

    pub fn id(&self) -> InvoiceId {
        self.values.id
    }

    pub fn requester_id(&self) -> AccountId {
        self.values.requester_id
    }

    pub fn payer_id(&self) -> AccountId {
        self.values.payer_id
    }

    pub fn amount(&self) -> Decimal {
        self.values.amount
    }

    pub fn currency(&self) -> Currency {
        self.values.currency
    }

    pub fn is_paid(&self) -> bool {
        self.values.paid
    }

    pub fn values(&self) -> &InvoiceValues {
        &self.values
    }

    pub fn into_values(self) -> InvoiceValues {
        self.values
    }
}

#[derive(Builder, Debug, Clone)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct NewInvoice {
    #[builder(setter(into))]
    pub(super) requester_id: AccountId,
    #[builder(setter(into))]
    pub(super) payer_id: AccountId,
    pub(super) amount: Decimal,
    pub(super) currency: Currency,
}

impl NewInvoice {
    pub fn builder() -> NewInvoiceBuilder {
        NewInvoiceBuilder::default()
    }
}

impl NewInvoiceBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(amount) = self.amount {
            if amount <= Decimal::ZERO {
                return Err(format!("Invoice amount must be positive, got {amount}"));
            }
        }
        if self.requester_id.is_some() && self.requester_id == self.payer_id {
            return Err("An account cannot invoice itself".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn rejects_non_positive_amount() {
        let res = NewInvoice::builder()
            .requester_id(AccountId::from(1))
            .payer_id(AccountId::from(2))
            .amount(dec!(0))
            .currency(Currency::Usd)
            .build();
        assert!(matches!(res, Err(NewInvoiceBuilderError::ValidationError(_))));
    }

    #[test]
    fn rejects_invoicing_oneself() {
        let res = NewInvoice::builder()
            .requester_id(AccountId::from(3))
            .payer_id(AccountId::from(3))
            .amount(dec!(10))
            .currency(Currency::Eur)
            .build();
        assert!(res.is_err());
    }
}
