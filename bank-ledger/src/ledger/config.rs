use derive_builder::Builder;
use es_entity::clock::Clock;

use std::sync::Arc;

use crate::{
    clock::ClockHandle,
    exchange::{ExchangeRates, StaticExchangeRates},
};

#[derive(Builder)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct BankLedgerConfig {
    #[builder(setter(into, strip_option), default)]
    pub(super) pg_con: Option<String>,
    #[builder(setter(into, strip_option), default)]
    pub(super) max_connections: Option<u32>,
    #[builder(default)]
    pub(super) exec_migrations: bool,
    #[builder(setter(into, strip_option), default)]
    pub(super) pool: Option<sqlx::PgPool>,
    #[builder(default = "Clock::handle().clone()")]
    pub(super) clock: ClockHandle,
    #[builder(setter(custom), default = "Arc::new(StaticExchangeRates::default())")]
    pub(super) exchange_rates: Arc<dyn ExchangeRates>,
}

impl BankLedgerConfig {
    pub fn builder() -> BankLedgerConfigBuilder {
        BankLedgerConfigBuilder::default()
    }
}

impl BankLedgerConfigBuilder {
    pub fn exchange_rates(&mut self, rates: impl ExchangeRates + 'static) -> &mut Self {
        self.exchange_rates = Some(Arc::new(rates));
        self
    }

    fn validate(&self) -> Result<(), String> {
        match (self.pg_con.as_ref(), self.pool.as_ref()) {
            (None, None) | (Some(None), None) | (None, Some(None)) => {
                return Err("One of pg_con or pool must be set".to_string())
            }
            (Some(_), Some(_)) => return Err("Only one of pg_con or pool must be set".to_string()),
            _ => (),
        }
        if let Some(Some(0)) = self.max_connections {
            return Err("max_connections must be positive".to_string());
        }
        Ok(())
    }
}
