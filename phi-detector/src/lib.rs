pub const DETECTOR_CONFIG: &'static str = include_str!("../detector.toml");

pub use error::{Error, Result};

pub mod clock;
pub mod config;
pub mod error;
pub mod ext;
pub mod failure_detector;
pub mod heartbeat_history;
pub mod settings;
