use tracing_subscriber::EnvFilter;

use crate::config::LogLevel;

/// Install the global fmt subscriber. `RUST_LOG` wins over `level` when set.
pub fn init(level: LogLevel) {
    tracing_subscriber::fmt()
        .with_env_filter(filter(level))
        .with_target(true)
        .init();
}

fn filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter()))
}
