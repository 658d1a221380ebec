use std::collections::VecDeque;

use crate::error::{Error, Result};

/// Bounded window of heartbeat inter-arrival times, in millis.
///
/// The sum and the sum of squares are kept alongside the samples so [`mean`](Self::mean) and
/// [`variance`](Self::variance) never rescan the window.
#[derive(Debug, Clone)]
pub struct HeartbeatHistory {
    max_sample_size: usize,
    intervals: VecDeque<f64>,
    interval_sum: f64,
    squared_interval_sum: f64,
}

impl HeartbeatHistory {
    /// # Panics
    ///
    /// If `max_sample_size` is zero.
    pub fn new(max_sample_size: usize) -> Self {
        assert!(max_sample_size > 0, "max_sample_size must be > 0, got {}", max_sample_size);
        Self {
            max_sample_size,
            intervals: VecDeque::with_capacity(max_sample_size),
            interval_sum: 0.0,
            squared_interval_sum: 0.0,
        }
    }

    pub fn max_sample_size(&self) -> usize {
        self.max_sample_size
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Retained intervals, oldest first.
    pub fn intervals(&self) -> impl Iterator<Item = &f64> {
        self.intervals.iter()
    }

    pub fn add_interval(&mut self, interval: f64) -> Result<()> {
        if !interval.is_finite() || interval < 0.0 {
            return Err(Error::InvalidInterval(interval));
        }
        if self.intervals.len() >= self.max_sample_size {
            self.drop_oldest();
        }
        self.intervals.push_back(interval);
        self.interval_sum += interval;
        self.squared_interval_sum += interval * interval;
        Ok(())
    }

    fn drop_oldest(&mut self) {
        if let Some(interval) = self.intervals.pop_front() {
            self.interval_sum -= interval;
            self.squared_interval_sum -= interval * interval;
        }
    }

    pub fn mean(&self) -> Result<f64> {
        if self.intervals.is_empty() {
            return Err(Error::EmptyHistory);
        }
        Ok(self.interval_sum / self.intervals.len() as f64)
    }

    /// Population variance. Cancellation on near-identical samples can push the raw value
    /// slightly below zero, so it is clamped.
    pub fn variance(&self) -> Result<f64> {
        let mean = self.mean()?;
        let variance = self.squared_interval_sum / self.intervals.len() as f64 - mean * mean;
        Ok(variance.max(0.0))
    }

    pub fn std_deviation(&self) -> Result<f64> {
        Ok(self.variance()?.max(0.0).sqrt())
    }
}
