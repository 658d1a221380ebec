use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Duration as written in configuration files, e.g. `{ milliseconds = 200 }`.
/// Components are summed, so `{ seconds = 1, milliseconds = 500 }` is 1.5s.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigDuration {
    #[serde(skip_serializing_if = "Option::is_none")]
    seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    milliseconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    microseconds: Option<u64>,
}

impl ConfigDuration {
    pub fn to_std_duration(&self) -> Duration {
        let seconds = self.seconds.unwrap_or(0);
        let milliseconds = self.milliseconds.unwrap_or(0);
        let microseconds = self.microseconds.unwrap_or(0);
        Duration::from_secs(seconds) + Duration::from_millis(milliseconds) + Duration::from_micros(microseconds)
    }

    pub fn from_secs(secs: u64) -> Self {
        Self {
            seconds: Some(secs),
            ..Default::default()
        }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self {
            milliseconds: Some(millis),
            ..Default::default()
        }
    }

    pub fn from_micros(micros: u64) -> Self {
        Self {
            microseconds: Some(micros),
            ..Default::default()
        }
    }
}

impl From<Duration> for ConfigDuration {
    fn from(value: Duration) -> Self {
        let micros = value.as_micros() as u64;
        if micros % 1000 != 0 {
            Self::from_micros(micros)
        } else if micros % 1_000_000 != 0 {
            Self::from_millis(micros / 1000)
        } else {
            Self::from_secs(micros / 1_000_000)
        }
    }
}
