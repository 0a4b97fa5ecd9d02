use tracing_subscriber::EnvFilter;

use crate::config::ForumConfig;

/// Installs the global fmt subscriber. `RUST_LOG` wins over the configured filter.
///
/// Safe to call more than once; only the first call installs anything.
pub fn init(config: &ForumConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter()));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
