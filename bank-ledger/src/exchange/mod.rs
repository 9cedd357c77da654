//! Exchange rates between the currencies accounts and transactions are held in.
pub mod error;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use std::collections::HashMap;

use bank_types::primitives::Currency;
use error::ExchangeError;

/// Supplies the rate to convert one unit of `from` into `to`.
///
/// Implementations must return exactly `1` when `from == to` and a strictly
/// positive rate otherwise.
#[async_trait]
pub trait ExchangeRates: Send + Sync {
    async fn rate(&self, from: Currency, to: Currency) -> Result<Decimal, ExchangeError>;
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ExchangeRatesConfig {
    #[serde(default)]
    pub rates: Vec<ExchangeRateEntry>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExchangeRateEntry {
    pub from: Currency,
    pub to: Currency,
    pub rate: Decimal,
}

/// Fixed rate table. Pairs that are not listed are unavailable.
#[derive(Clone, Debug, Default)]
pub struct StaticExchangeRates {
    rates: HashMap<(Currency, Currency), Decimal>,
}

impl StaticExchangeRates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rate(
        mut self,
        from: Currency,
        to: Currency,
        rate: Decimal,
    ) -> Result<Self, ExchangeError> {
        if rate <= Decimal::ZERO {
            return Err(ExchangeError::NonPositiveRate(from, to));
        }
        if from != to {
            self.rates.insert((from, to), rate);
        }
        Ok(self)
    }

    pub fn from_config(config: &ExchangeRatesConfig) -> Result<Self, ExchangeError> {
        config
            .rates
            .iter()
            .try_fold(Self::new(), |rates, entry| {
                rates.with_rate(entry.from, entry.to, entry.rate)
            })
    }
}

#[async_trait]
impl ExchangeRates for StaticExchangeRates {
    async fn rate(&self, from: Currency, to: Currency) -> Result<Decimal, ExchangeError> {
        if from == to {
            return Ok(Decimal::ONE);
        }
        self.rates
            .get(&(from, to))
            .copied()
            .ok_or(ExchangeError::Unavailable(from, to))
    }
}
