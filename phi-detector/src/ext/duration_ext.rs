use std::time::Duration;

pub trait DurationExt {
    fn millis(self) -> Duration;

    fn seconds(self) -> Duration;
}

impl DurationExt for u64 {
    fn millis(self) -> Duration {
        Duration::from_millis(self)
    }

    fn seconds(self) -> Duration {
        Duration::from_secs(self)
    }
}

pub trait ToMillisF64 {
    /// Fractional millis, keeping sub-millisecond precision.
    fn to_millis_f64(&self) -> f64;
}

impl ToMillisF64 for Duration {
    fn to_millis_f64(&self) -> f64 {
        self.as_nanos() as f64 / 1_000_000.0
    }
}
