#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![cfg_attr(feature = "fail-on-warnings", deny(clippy::all))]

use serde::{Deserialize, Serialize};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub use tracing::*;

const DEFAULT_FILTER: &str = "info,sqlx=warn";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracingConfig {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_json")]
    pub json: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            json: default_json(),
        }
    }
}

/// Installs the global subscriber. `RUST_LOG` takes precedence over the default filter.
pub fn init_tracer(config: TracingConfig) -> anyhow::Result<()> {
    let filter_layer =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))?;
    let registry = tracing_subscriber::registry().with(filter_layer);
    if config.json {
        registry.with(fmt::layer().json()).try_init()?;
    } else {
        registry.with(fmt::layer()).try_init()?;
    }
    info!(service_name = %config.service_name, "tracing initialised");

    Ok(())
}

fn default_service_name() -> String {
    "bank-ledger".to_string()
}

fn default_json() -> bool {
    true
}
