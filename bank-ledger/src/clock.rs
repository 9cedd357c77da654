use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use es_entity::clock::{ClockController, ClockHandle};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClockConfig {
    pub realtime: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sim_time: Option<SimTimeConfig>,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            realtime: true,
            sim_time: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimTimeConfig {
    #[serde(default = "Utc::now")]
    pub start_at: DateTime<Utc>,
}

impl ClockConfig {
    /// Builds the handle every operation reads "now" from.
    /// Simulated time starts at `start_at` and only moves through the returned controller.
    pub fn build(&self) -> (ClockHandle, Option<ClockController>) {
        if self.realtime {
            return (ClockHandle::realtime(), None);
        }
        let start_at = self
            .sim_time
            .as_ref()
            .map(|sim| sim.start_at)
            .unwrap_or_else(Utc::now);
        let (handle, ctrl) = ClockHandle::manual_at(start_at);
        (handle, Some(ctrl))
    }
}
