use std::time::Duration;

use typed_builder::TypedBuilder;

use crate::error::{Error, Result};

/// Settings of a [`PhiAccrualFailureDetector`](crate::failure_detector::phi_accrual_failure_detector::PhiAccrualFailureDetector).
///
/// [threshold] A low threshold is prone to generate many wrong suspicions but ensures a quick detection in the event
///  of a real crash. Conversely, a high threshold generates fewer mistakes but needs more time to detect
///  actual crashes.
/// [max_sample_size] Number of samples to use for calculation of mean and standard deviation of
///  inter-arrival times.
/// [min_std_deviation] Minimum standard deviation to use when calculating phi.
///  Too low standard deviation might result in too much sensitivity for sudden, but normal, deviations
///  in heartbeat inter arrival times.
/// [acceptable_heartbeat_pause] Duration corresponding to number of potentially lost/delayed
///  heartbeats that will be accepted before considering it to be an anomaly.
/// [first_heartbeat_estimate] Bootstrap the stats with heartbeats that corresponds to
///  this duration, with a rather high standard deviation (since environment is unknown
///  in the beginning).
#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct PhiAccrualSettings {
    pub threshold: f64,
    pub max_sample_size: usize,
    pub min_std_deviation: Duration,
    pub acceptable_heartbeat_pause: Duration,
    pub first_heartbeat_estimate: Duration,
}

impl PhiAccrualSettings {
    pub fn validate(&self) -> Result<()> {
        if !(self.threshold > 0.0) {
            return Err(Error::InvalidSettings(format!("threshold must be > 0, got {}", self.threshold)));
        }
        if self.max_sample_size == 0 {
            return Err(Error::InvalidSettings("max-sample-size must be > 0".to_string()));
        }
        if self.first_heartbeat_estimate.is_zero() {
            return Err(Error::InvalidSettings("first-heartbeat-estimate must be > 0".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::error::Error;
    use crate::settings::PhiAccrualSettings;

    fn settings() -> PhiAccrualSettings {
        PhiAccrualSettings::builder()
            .threshold(8.0)
            .max_sample_size(100)
            .min_std_deviation(Duration::from_millis(100))
            .acceptable_heartbeat_pause(Duration::from_millis(200))
            .first_heartbeat_estimate(Duration::from_millis(500))
            .build()
    }

    #[test]
    fn valid_settings() {
        assert!(settings().validate().is_ok());
    }

    #[test]
    fn reject_non_positive_threshold() {
        let mut s = settings();
        s.threshold = 0.0;
        assert!(matches!(s.validate(), Err(Error::InvalidSettings(_))));
        s.threshold = f64::NAN;
        assert!(matches!(s.validate(), Err(Error::InvalidSettings(_))));
    }

    #[test]
    fn reject_empty_window() {
        let mut s = settings();
        s.max_sample_size = 0;
        assert!(matches!(s.validate(), Err(Error::InvalidSettings(_))));
    }

    #[test]
    fn reject_zero_first_heartbeat_estimate() {
        let mut s = settings();
        s.first_heartbeat_estimate = Duration::ZERO;
        assert!(matches!(s.validate(), Err(Error::InvalidSettings(_))));
    }
}
