use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use tracing::error;

use crate::ext::duration_ext::ToMillisF64;

/// Source of the current time in milliseconds.
///
/// The detector only ever subtracts two readings from the same clock, so the epoch is irrelevant.
/// Tests and simulations inject a [`ManualClock`] to drive elapsed time without sleeping.
pub trait Clock: Debug + Send + Sync {
    fn now_millis(&self) -> f64;
}

/// Monotonic clock backed by [`Instant`], immune to wall-clock adjustments.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_millis(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Wall-clock millis since the UNIX epoch. Can jump backwards when the system time is adjusted.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> f64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(since_epoch) => since_epoch.as_millis() as f64,
            Err(error) => {
                error!("system time is before the unix epoch: {}", error);
                0.0
            }
        }
    }
}

/// Manually driven clock. Clones share the same underlying time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    millis: Arc<Mutex<f64>>,
}

impl ManualClock {
    pub fn new(millis: f64) -> Self {
        Self {
            millis: Arc::new(Mutex::new(millis)),
        }
    }

    pub fn set(&self, millis: f64) {
        *self.millis.lock() = millis;
    }

    pub fn advance(&self, duration: Duration) {
        *self.millis.lock() += duration.to_millis_f64();
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> f64 {
        *self.millis.lock()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::clock::{Clock, ManualClock, MonotonicClock, SystemClock};

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new(10.0);
        let other = clock.clone();
        clock.advance(Duration::from_millis(250));
        assert_eq!(other.now_millis(), 260.0);
        other.set(5.0);
        assert_eq!(clock.now_millis(), 5.0);
    }

    #[test]
    fn monotonic_clock_never_goes_backwards() {
        let clock = MonotonicClock::new();
        let first = clock.now_millis();
        let second = clock.now_millis();
        assert!(second >= first);
    }

    #[test]
    fn system_clock_is_wall_clock_millis() {
        let millis = SystemClock.now_millis();
        assert!(millis > 1_600_000_000_000.0);
        assert_eq!(millis.fract(), 0.0);
    }
}
