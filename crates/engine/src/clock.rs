#![forbid(unsafe_code)]

use async_trait::async_trait;
use std::time::{Duration, SystemTime};

/// Time source for the engine. Injected so tests can drive deadlines and
/// grace waits without real sleeping.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
