//! Time source used for breaker cooldowns, backoff waits and DLQ timestamps.
//!
//! Production code uses [`SystemClock`]. [`ManualClock`] never blocks: every
//! `sleep` is recorded and advances its virtual time instantly, so tests can
//! assert exact backoff schedules and simulate breaker cooldowns.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

/// Future returned by [`Clock::sleep`].
pub type Sleep = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

pub trait Clock: Send + Sync + fmt::Debug {
    /// Monotonic "now".
    fn now(&self) -> Instant;
    /// Wall-clock time as Unix milliseconds.
    fn unix_millis(&self) -> i64;
    /// Suspend the calling task for `duration`.
    fn sleep(&self, duration: Duration) -> Sleep;
}

/// Real time, backed by tokio timers.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn unix_millis(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }

    fn sleep(&self, duration: Duration) -> Sleep {
        Box::pin(tokio::time::sleep(duration))
    }
}

#[derive(Debug)]
struct ManualState {
    elapsed: Duration,
    sleeps: Vec<Duration>,
}

/// Virtual clock that only moves when told to (or when something sleeps on it).
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    wall_origin_ms: i64,
    state: Arc<Mutex<ManualState>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            wall_origin_ms: SystemClock.unix_millis(),
            state: Arc::new(Mutex::new(ManualState {
                elapsed: Duration::ZERO,
                sleeps: Vec::new(),
            })),
        }
    }

    /// Move virtual time forward without recording a sleep.
    pub fn advance(&self, by: Duration) {
        let mut state = self.state.lock();
        state.elapsed = state.elapsed.saturating_add(by);
    }

    /// Total virtual time elapsed since creation.
    pub fn elapsed(&self) -> Duration {
        self.state.lock().elapsed
    }

    /// Every duration passed to `sleep`, in call order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.state.lock().sleeps.clone()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.state.lock().elapsed
    }

    fn unix_millis(&self) -> i64 {
        self.wall_origin_ms + self.state.lock().elapsed.as_millis() as i64
    }

    fn sleep(&self, duration: Duration) -> Sleep {
        let mut state = self.state.lock();
        state.sleeps.push(duration);
        state.elapsed = state.elapsed.saturating_add(duration);
        Box::pin(std::future::ready(()))
    }
}
