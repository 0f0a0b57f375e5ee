#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::time::Duration;

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Scheduler {
    /// How often the task queue is evaluated for due kills. A tick that
    /// takes longer than this interval delays the next tick; ticks never
    /// overlap or queue up. **Measured in seconds**.
    #[serde_as(as = "serde_with::DurationSeconds")]
    pub tick_interval: Duration,

    /// Whether the scheduler starts enabled. When disabled, due tasks stay
    /// pending and fire on the first tick after re-enabling.
    pub start_enabled: bool,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            start_enabled: true,
        }
    }
}
