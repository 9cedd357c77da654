use thiserror::Error;

use bank_types::primitives::Currency;

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("ExchangeError - Unavailable: no rate from {0} to {1}")]
    Unavailable(Currency, Currency),
    #[error("ExchangeError - NonPositiveRate: rate from {0} to {1} must be positive")]
    NonPositiveRate(Currency, Currency),
}
