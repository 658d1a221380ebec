use thiserror::Error;

pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot compute statistics of an empty heartbeat history")]
    EmptyHistory,
    #[error("heartbeat interval must be a finite, non-negative number of millis, got {0}")]
    InvalidInterval(f64),
    #[error("invalid failure detector settings: {0}")]
    InvalidSettings(String),
    #[error(transparent)]
    Config(#[from] config::ConfigError),
}
