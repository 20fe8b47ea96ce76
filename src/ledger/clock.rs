// Time source for the simulated ledger. All latency and timestamps go through here.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::trace;

#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
    async fn sleep(&self, duration: Duration);
}

/// Wall clock + tokio timers. Honours `tokio::time::pause` in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Deterministic clock. `sleep` moves the clock forward instead of waiting.
#[derive(Debug, Clone)]
pub struct ManualClock {
    inner: Arc<Mutex<ManualState>>,
}

#[derive(Debug)]
struct ManualState {
    now: DateTime<Utc>,
    slept: Duration,
    sleeps: usize,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ManualState {
                now: start,
                slept: Duration::ZERO,
                sleeps: 0,
            })),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.inner.lock().now = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut state = self.inner.lock();
        state.now = advance_saturating(state.now, by);
    }

    /// Total simulated time spent in `sleep`.
    pub fn slept(&self) -> Duration {
        self.inner.lock().slept
    }

    pub fn sleep_count(&self) -> usize {
        self.inner.lock().sleeps
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.inner.lock().now
    }

    async fn sleep(&self, duration: Duration) {
        {
            let mut state = self.inner.lock();
            state.now = advance_saturating(state.now, duration);
            state.slept += duration;
            state.sleeps += 1;
            trace!(?duration, now = %state.now, "manual clock advanced");
        }
        // still a suspension point, like a real timer
        tokio::task::yield_now().await;
    }
}

// Sticks at the current instant if the step does not fit chrono's range.
fn advance_saturating(now: DateTime<Utc>, by: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(by)
        .ok()
        .and_then(|step| now.checked_add_signed(step))
        .unwrap_or(now)
}
