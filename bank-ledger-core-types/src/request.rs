use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{account::AccountPolicy, primitives::*};

/// An opening request together with the account it asks for.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RequestValues {
    pub id: RequestId,
    pub requester_id: UserId,
    pub balance: Decimal,
    pub currency: Currency,
    pub expires_end: Option<NaiveDate>,
    pub policy: AccountPolicy,
    pub considered: bool,
    pub created_at: DateTime<Utc>,
}

impl RequestValues {
    pub fn kind(&self) -> AccountKind {
        self.policy.kind()
    }
}
