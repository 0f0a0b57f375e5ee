#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::time::Duration;

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Termination {
    /// How long a process is given to exit after the graceful stop request
    /// before the forceful stop is sent. **Measured in seconds**.
    ///
    /// # Note
    ///
    /// This wait bounds the latency of a single tick. With several tasks
    /// due in the same tick, each pays its own wait sequentially.
    #[serde_as(as = "serde_with::DurationSeconds")]
    pub grace_timeout: Duration,

    /// How often the process is polled for exit during the grace window.
    /// **Measured in milliseconds**.
    #[serde_as(as = "serde_with::DurationMilliSeconds")]
    pub poll_interval: Duration,
}

impl Default for Termination {
    fn default() -> Self {
        Self {
            grace_timeout: Duration::from_secs(3),
            poll_interval: Duration::from_millis(100),
        }
    }
}
