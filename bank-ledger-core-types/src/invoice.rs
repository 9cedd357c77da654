use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::primitives::*;

/// A payment the requester account asks of the payer account.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InvoiceValues {
    pub id: InvoiceId,
    pub requester_id: AccountId,
    pub payer_id: AccountId,
    pub amount: Decimal,
    pub currency: Currency,
    pub paid: bool,
    pub created_at: DateTime<Utc>,
}

impl InvoiceValues {
    /// True when `account_id` is one of the two parties.
    pub fn involves(&self, account_id: AccountId) -> bool {
        self.requester_id == account_id || self.payer_id == account_id
    }
}
