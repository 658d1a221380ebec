use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, warn};

use crate::clock::{Clock, MonotonicClock};
use crate::error::Result;
use crate::ext::duration_ext::ToMillisF64;
use crate::failure_detector::FailureDetector;
use crate::heartbeat_history::HeartbeatHistory;
use crate::settings::PhiAccrualSettings;

const MIN_STD_DEVIATION_MILLIS: f64 = 0.001;
const MAX_Y: f64 = 700.0;

/// Implementation of 'The Phi Accrual Failure Detector' by Hayashibara et al. as defined in their paper:
/// [https://oneofus.la/have-emacs-will-hack/files/HDY04.pdf]
///
/// The suspicion level of failure is given by a value called φ (phi).
/// The basic idea of the φ failure detector is to express the value of φ on a scale that
/// is dynamically adjusted to reflect current network conditions. A configurable
/// threshold is used to decide if φ is considered to be a failure.
///
/// The value of φ is calculated as:
///
/// ```text
/// φ = -log10(1 - F(timeSinceLastHeartbeat))
/// ```
/// where F is the cumulative distribution function of a logistic approximation of the normal
/// distribution with mean and standard deviation estimated from historical heartbeat inter-arrival times.
///
/// Until the first heartbeat arrives the detector is bootstrapping and reports φ = 0.
/// The history is seeded with two intervals around `first_heartbeat_estimate` so the statistics are
/// defined from the start.
///
/// The clock returns the current time in milliseconds and can be faked for testing purposes.
/// It is only used for measuring intervals.
pub struct PhiAccrualFailureDetector {
    max_sample_size: usize,
    min_std_deviation: f64,
    acceptable_heartbeat_pause: f64,
    first_heartbeat_estimate: f64,
    clock: Arc<dyn Clock>,
    address: Mutex<Option<String>>,
    state: Mutex<State>,
}

#[derive(Debug)]
struct State {
    threshold: f64,
    history: HeartbeatHistory,
    timestamp: Option<f64>,
}

impl PhiAccrualFailureDetector {
    pub fn new(settings: PhiAccrualSettings) -> Result<Self> {
        Self::with_clock(settings, Arc::new(MonotonicClock::new()))
    }

    pub fn with_clock(settings: PhiAccrualSettings, clock: Arc<dyn Clock>) -> Result<Self> {
        settings.validate()?;
        let first_heartbeat_estimate = settings.first_heartbeat_estimate.to_millis_f64();
        let history = Self::first_heartbeat(first_heartbeat_estimate, settings.max_sample_size)?;
        let detector = Self {
            max_sample_size: settings.max_sample_size,
            min_std_deviation: settings.min_std_deviation.to_millis_f64(),
            acceptable_heartbeat_pause: settings.acceptable_heartbeat_pause.to_millis_f64(),
            first_heartbeat_estimate,
            clock,
            address: Mutex::new(None),
            state: Mutex::new(State {
                threshold: settings.threshold,
                history,
                timestamp: None,
            }),
        };
        Ok(detector)
    }

    fn first_heartbeat(first_heartbeat_estimate: f64, max_sample_size: usize) -> Result<HeartbeatHistory> {
        let mean = first_heartbeat_estimate;
        let std_deviation = mean / 4.0;
        let mut history = HeartbeatHistory::new(max_sample_size);
        history.add_interval(mean - std_deviation)?;
        history.add_interval(mean + std_deviation)?;
        Ok(history)
    }

    pub fn threshold(&self) -> f64 {
        self.state.lock().threshold
    }

    pub fn set_threshold(&self, threshold: f64) {
        self.state.lock().threshold = threshold;
    }

    /// Labels the monitored resource in diagnostics.
    pub fn set_address(&self, address: impl Into<String>) {
        *self.address.lock() = Some(address.into());
    }

    pub fn address(&self) -> Option<String> {
        self.address.lock().clone()
    }

    fn calc_phi(&self, state: &State, timestamp: f64) -> f64 {
        match state.timestamp {
            None => {
                0.0
            }
            Some(last_timestamp) => {
                let time_diff = timestamp - last_timestamp;
                match self.effective_mean_and_std_deviation(&state.history) {
                    Ok((mean, std_deviation)) => Self::compute_phi(time_diff, mean, std_deviation),
                    Err(error) => {
                        error!("phi calculation failed for {}, assume available: {}", self.address_label(), error);
                        0.0
                    }
                }
            }
        }
    }

    fn effective_mean_and_std_deviation(&self, history: &HeartbeatHistory) -> Result<(f64, f64)> {
        let mean = history.mean()? + self.acceptable_heartbeat_pause;
        let std_deviation = self.ensure_valid_std_deviation(history.std_deviation()?);
        Ok((mean, std_deviation))
    }

    /// Calculation of phi, derived from the cumulative distribution function for
    /// N(mean, std_deviation) normal distribution, given by
    /// 1.0 / (1.0 + exp(-y * (1.5976 + 0.070566 * y * y)))
    /// where y = (x - mean) / standard_deviation
    /// This is an approximation defined in β Mathematics Handbook (Logistic approximation).
    /// Error is 0.00014 at +- 3.16
    /// The calculated value is equivalent to -log10(1 - CDF(y))
    ///
    /// Far past the mean `e` underflows to zero and φ becomes `+inf`. Far before the mean `e`
    /// overflows to `+inf` and φ is `0`.
    pub fn compute_phi(time_diff: f64, mean: f64, std_deviation: f64) -> f64 {
        let std_deviation = std_deviation.max(MIN_STD_DEVIATION_MILLIS);
        let y = (time_diff - mean) / std_deviation;
        if y.abs() > MAX_Y {
            warn!("phi y value {} is out of the stable range and may overflow", y);
        }
        let y = y.min(MAX_Y);
        let e = f64::exp(-y * (1.5976 + 0.070566 * y * y));
        let phi = if time_diff > mean {
            -f64::log10(e / (1.0 + e))
        } else if e.is_infinite() {
            0.0
        } else {
            -f64::log10(1.0 - 1.0 / (1.0 + e))
        };
        if phi.is_nan() {
            0.0
        } else {
            phi.max(0.0)
        }
    }

    fn ensure_valid_std_deviation(&self, std_deviation: f64) -> f64 {
        std_deviation.max(self.min_std_deviation)
    }

    fn record_heartbeat(&self, state: &mut State, timestamp: f64) -> Result<()> {
        if let Some(latest_timestamp) = state.timestamp {
            let interval = timestamp - latest_timestamp;
            if Self::is_interval_growing_too_large(interval, self.acceptable_heartbeat_pause) {
                warn!("heartbeat interval is growing too large for address {}: {} millis", self.address_label(), interval);
            }
            state.history.add_interval(interval)?;
        }
        Ok(())
    }

    /// An interval at two thirds of the acceptable pause is worth a warning, the peer is
    /// getting close to being suspected.
    fn is_interval_growing_too_large(interval: f64, acceptable_heartbeat_pause: f64) -> bool {
        interval >= acceptable_heartbeat_pause / 3.0 * 2.0
    }

    fn address_label(&self) -> String {
        self.address.lock().clone().unwrap_or_else(|| "unknown".to_string())
    }
}

impl Debug for PhiAccrualFailureDetector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("PhiAccrualFailureDetector")
            .field("threshold", &state.threshold)
            .field("max_sample_size", &self.max_sample_size)
            .field("min_std_deviation", &self.min_std_deviation)
            .field("acceptable_heartbeat_pause", &self.acceptable_heartbeat_pause)
            .field("first_heartbeat_estimate", &self.first_heartbeat_estimate)
            .field("clock", &self.clock)
            .field("timestamp", &state.timestamp)
            .field("samples", &state.history.len())
            .finish_non_exhaustive()
    }
}

impl FailureDetector for PhiAccrualFailureDetector {
    fn is_available(&self) -> bool {
        let state = self.state.lock();
        let phi = self.calc_phi(&state, self.clock.now_millis());
        phi < state.threshold
    }

    fn is_monitoring(&self) -> bool {
        self.state.lock().timestamp.is_some()
    }

    fn heartbeat(&self) {
        let mut state = self.state.lock();
        let timestamp = self.clock.now_millis();
        if let Err(error) = self.record_heartbeat(&mut state, timestamp) {
            error!("failed to record heartbeat for {}: {}", self.address_label(), error);
        }
        if state.timestamp.is_none() {
            debug!("start monitoring {}", self.address_label());
        }
        state.timestamp = Some(timestamp);
    }

    fn phi(&self) -> f64 {
        let state = self.state.lock();
        self.calc_phi(&state, self.clock.now_millis())
    }
}
