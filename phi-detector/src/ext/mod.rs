use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::LocalTime;

pub mod duration_ext;

/// Crates of this workspace. Anything else stays silent unless `RUST_LOG` asks for it.
const LOG_TARGETS: [&str; 2] = ["phi_detector", "phi_playground"];

pub fn default_directives(level: Level) -> String {
    let level = level.as_str().to_lowercase();
    LOG_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Logs this workspace at `level`, unless `RUST_LOG` is set.
pub fn init_logger(level: Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));
    init_logger_with_filter(filter)
}

/// Installs the global subscriber. A second call keeps the first subscriber.
pub fn init_logger_with_filter(filter: impl Into<EnvFilter>) {
    let format = tracing_subscriber::fmt::format()
        .with_timer(LocalTime::rfc_3339())
        .compact()
        .with_target(true);
    let installed = tracing_subscriber::fmt()
        .event_format(format)
        .with_env_filter(filter)
        .try_init();
    if installed.is_err() {
        tracing::debug!("global logger already installed");
    }
}
