use serde::{Deserialize, Serialize};

use std::time::Duration;

#[serde_with::serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MaintenanceConfig {
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    #[serde(default = "default_poll_interval")]
    pub poll_interval: Duration,
    #[serde(default = "default_true")]
    pub block_expired: bool,
    #[serde(default = "default_true")]
    pub accrue_deposits: bool,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            block_expired: true,
            accrue_deposits: true,
        }
    }
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(3600)
}

fn default_true() -> bool {
    true
}
