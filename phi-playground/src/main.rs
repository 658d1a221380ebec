use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use config::File;
use tracing::{info, warn};

use phi_detector::config::DetectorConfig;
use phi_detector::ext::duration_ext::DurationExt;
use phi_detector::ext::init_logger_with_filter;
use phi_detector::failure_detector::phi_accrual_failure_detector::PhiAccrualFailureDetector;
use phi_detector::failure_detector::FailureDetector;
use phi_detector::settings::PhiAccrualSettings;

/// Sends heartbeats to a phi accrual failure detector, then goes silent and reports how
/// suspicion grows.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// TOML file overriding the reference detector configuration.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    threshold: Option<f64>,
    #[arg(long)]
    max_sample_size: Option<usize>,
    #[arg(long)]
    min_std_deviation_ms: Option<u64>,
    #[arg(long)]
    acceptable_heartbeat_pause_ms: Option<u64>,
    #[arg(long)]
    first_heartbeat_estimate_ms: Option<u64>,
    /// Number of heartbeats to send before pausing.
    #[arg(long, default_value_t = 10)]
    heartbeats: usize,
    #[arg(long, default_value_t = 100)]
    interval_ms: u64,
    /// Silence after the last heartbeat.
    #[arg(long, default_value_t = 1000)]
    pause_ms: u64,
    /// How often phi is reported during the pause.
    #[arg(long, default_value_t = 250)]
    probe_ms: u64,
    #[arg(long, default_value = "node-a")]
    address: String,
}

impl Args {
    fn settings(&self) -> anyhow::Result<PhiAccrualSettings> {
        let mut builder = DetectorConfig::builder();
        if let Some(path) = &self.config {
            builder = builder.add_source(File::from(path.as_path()));
        }
        let mut settings = builder.build()?.to_settings()?;
        if let Some(threshold) = self.threshold {
            settings.threshold = threshold;
        }
        if let Some(max_sample_size) = self.max_sample_size {
            settings.max_sample_size = max_sample_size;
        }
        if let Some(min_std_deviation) = self.min_std_deviation_ms {
            settings.min_std_deviation = min_std_deviation.millis();
        }
        if let Some(acceptable_heartbeat_pause) = self.acceptable_heartbeat_pause_ms {
            settings.acceptable_heartbeat_pause = acceptable_heartbeat_pause.millis();
        }
        if let Some(first_heartbeat_estimate) = self.first_heartbeat_estimate_ms {
            settings.first_heartbeat_estimate = first_heartbeat_estimate.millis();
        }
        Ok(settings)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger_with_filter("phi_playground=info,phi_detector=warn");
    let args = Args::parse();
    let settings = args.settings()?;
    info!("{:?}", settings);
    let detector = PhiAccrualFailureDetector::new(settings)?;
    detector.set_address(args.address.clone());
    info!("simulating heartbeats");
    for i in 1..=args.heartbeats {
        detector.heartbeat();
        tokio::time::sleep(args.interval_ms.millis()).await;
        info!("heartbeat {}: phi={:.2}, is_available={}", i, detector.phi(), detector.is_available());
    }
    info!("simulating a pause of {} millis", args.pause_ms);
    let mut silent = Duration::ZERO;
    let pause = args.pause_ms.millis();
    let probe = args.probe_ms.max(1).millis();
    while silent < pause {
        let step = probe.min(pause - silent);
        tokio::time::sleep(step).await;
        silent += step;
        let phi = detector.phi();
        if detector.is_available() {
            info!("after {:?} silent: phi={:.2}, is_available=true", silent, phi);
        } else {
            warn!("after {:?} silent: phi={:.2}, is_available=false", silent, phi);
        }
    }
    Ok(())
}
