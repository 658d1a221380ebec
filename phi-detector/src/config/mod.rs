use config::{File, FileFormat, Source};
use config::builder::DefaultState;
use serde::{Deserialize, Serialize};

use crate::config::duration::ConfigDuration;
use crate::error::Result;
use crate::settings::PhiAccrualSettings;
use crate::DETECTOR_CONFIG;

pub mod duration;

/// File representation of [`PhiAccrualSettings`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    pub threshold: f64,
    #[serde(rename = "max-sample-size")]
    pub max_sample_size: usize,
    #[serde(rename = "min-std-deviation")]
    pub min_std_deviation: ConfigDuration,
    #[serde(rename = "acceptable-heartbeat-pause")]
    pub acceptable_heartbeat_pause: ConfigDuration,
    #[serde(rename = "first-heartbeat-estimate")]
    pub first_heartbeat_estimate: ConfigDuration,
}

impl DetectorConfig {
    pub fn builder() -> DetectorConfigBuilder {
        DetectorConfigBuilder::default()
    }

    /// The embedded reference configuration with no overrides.
    pub fn reference() -> Result<Self> {
        Self::builder().build()
    }

    pub fn to_settings(&self) -> Result<PhiAccrualSettings> {
        let settings = PhiAccrualSettings::builder()
            .threshold(self.threshold)
            .max_sample_size(self.max_sample_size)
            .min_std_deviation(self.min_std_deviation.to_std_duration())
            .acceptable_heartbeat_pause(self.acceptable_heartbeat_pause.to_std_duration())
            .first_heartbeat_estimate(self.first_heartbeat_estimate.to_std_duration())
            .build();
        settings.validate()?;
        Ok(settings)
    }
}

/// A partially specified [`DetectorConfig`] coming from user sources.
///
/// A duration given here replaces the reference duration as a whole, it is never merged unit by unit.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
struct DetectorConfigOverrides {
    threshold: Option<f64>,
    #[serde(rename = "max-sample-size")]
    max_sample_size: Option<usize>,
    #[serde(rename = "min-std-deviation")]
    min_std_deviation: Option<ConfigDuration>,
    #[serde(rename = "acceptable-heartbeat-pause")]
    acceptable_heartbeat_pause: Option<ConfigDuration>,
    #[serde(rename = "first-heartbeat-estimate")]
    first_heartbeat_estimate: Option<ConfigDuration>,
}

impl DetectorConfigOverrides {
    fn apply(self, reference: DetectorConfig) -> DetectorConfig {
        DetectorConfig {
            threshold: self.threshold.unwrap_or(reference.threshold),
            max_sample_size: self.max_sample_size.unwrap_or(reference.max_sample_size),
            min_std_deviation: self.min_std_deviation.unwrap_or(reference.min_std_deviation),
            acceptable_heartbeat_pause: self.acceptable_heartbeat_pause.unwrap_or(reference.acceptable_heartbeat_pause),
            first_heartbeat_estimate: self.first_heartbeat_estimate.unwrap_or(reference.first_heartbeat_estimate),
        }
    }
}

impl From<&PhiAccrualSettings> for DetectorConfig {
    fn from(value: &PhiAccrualSettings) -> Self {
        Self {
            threshold: value.threshold,
            max_sample_size: value.max_sample_size,
            min_std_deviation: value.min_std_deviation.into(),
            acceptable_heartbeat_pause: value.acceptable_heartbeat_pause.into(),
            first_heartbeat_estimate: value.first_heartbeat_estimate.into(),
        }
    }
}

/// Layers user sources over the embedded reference configuration. Among user sources, later ones win.
#[derive(Debug, Default)]
pub struct DetectorConfigBuilder {
    builder: config::ConfigBuilder<DefaultState>,
}

impl DetectorConfigBuilder {
    pub fn add_source<T>(self, source: T) -> Self where T: Source + Send + Sync + 'static {
        Self { builder: self.builder.add_source(source) }
    }

    pub fn add_toml_str(self, toml: &str) -> Self {
        self.add_source(File::from_str(toml, FileFormat::Toml))
    }

    pub fn build(self) -> Result<DetectorConfig> {
        let reference = config::Config::builder()
            .add_source(File::from_str(DETECTOR_CONFIG, FileFormat::Toml))
            .build()?
            .try_deserialize::<DetectorConfig>()?;
        let overrides = self.builder
            .build()?
            .try_deserialize::<DetectorConfigOverrides>()?;
        Ok(overrides.apply(reference))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::config::duration::ConfigDuration;
    use crate::config::DetectorConfig;
    use crate::error::Error;

    #[test]
    fn load_reference_config() -> anyhow::Result<()> {
        let config = DetectorConfig::reference()?;
        assert_eq!(config.threshold, 8.0);
        assert_eq!(config.max_sample_size, 100);
        let settings = config.to_settings()?;
        assert_eq!(settings.min_std_deviation, Duration::from_millis(100));
        assert_eq!(settings.acceptable_heartbeat_pause, Duration::from_millis(200));
        assert_eq!(settings.first_heartbeat_estimate, Duration::from_millis(500));
        Ok(())
    }

    #[test]
    fn override_reference_config() -> anyhow::Result<()> {
        let config = DetectorConfig::builder()
            .add_toml_str(r#"
                threshold = 12.5

                [min-std-deviation]
                milliseconds = 50
            "#)
            .build()?;
        assert_eq!(config.threshold, 12.5);
        assert_eq!(config.max_sample_size, 100);
        assert_eq!(config.min_std_deviation, ConfigDuration::from_millis(50));
        let settings = config.to_settings()?;
        assert_eq!(settings.min_std_deviation, Duration::from_millis(50));
        Ok(())
    }

    #[test]
    fn duration_override_replaces_reference_units() -> anyhow::Result<()> {
        let settings = DetectorConfig::builder()
            .add_toml_str("[acceptable-heartbeat-pause]\nseconds = 3\n")
            .build()?
            .to_settings()?;
        assert_eq!(settings.acceptable_heartbeat_pause, Duration::from_secs(3));
        assert_eq!(settings.min_std_deviation, Duration::from_millis(100));
        let settings = DetectorConfig::builder()
            .add_toml_str("[first-heartbeat-estimate]\nmicroseconds = 1500\n")
            .build()?
            .to_settings()?;
        assert_eq!(settings.first_heartbeat_estimate, Duration::from_micros(1500));
        Ok(())
    }

    #[test]
    fn invalid_override_is_rejected() -> anyhow::Result<()> {
        let config = DetectorConfig::builder()
            .add_toml_str("max-sample-size = 0")
            .build()?;
        assert!(matches!(config.to_settings(), Err(Error::InvalidSettings(_))));
        Ok(())
    }

    #[test]
    fn settings_round_trip_through_toml() -> anyhow::Result<()> {
        let settings = DetectorConfig::reference()?.to_settings()?;
        let config = DetectorConfig::from(&settings);
        let str = toml::to_string(&config)?;
        println!("{}", str);
        let loaded = DetectorConfig::builder().add_toml_str(&str).build()?;
        assert_eq!(loaded.to_settings()?, settings);
        Ok(())
    }

    #[test]
    fn config_duration_sums_components() {
        let duration: ConfigDuration = toml::from_str("seconds = 1\nmilliseconds = 500\nmicroseconds = 250").unwrap();
        assert_eq!(duration.to_std_duration(), Duration::from_micros(1_500_250));
        assert_eq!(ConfigDuration::from(Duration::from_secs(3)), ConfigDuration::from_secs(3));
        assert_eq!(ConfigDuration::from(Duration::from_millis(1500)), ConfigDuration::from_millis(1500));
    }
}
