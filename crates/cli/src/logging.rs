use tracing_subscriber::EnvFilter;

const DEFAULT_LEVEL: &str = "warn";

/// Install the stderr subscriber. Stdout carries command output only.
///
/// The filter comes from `--log-level`, then `RUST_LOG`, then the config
/// file, then [`DEFAULT_LEVEL`]. Invalid directives fall back to the default.
/// Returns false when a global subscriber was already installed.
pub fn init_logger(flag: Option<&str>, configured: Option<&str>) -> bool {
    let filter = match flag {
        Some(level) => EnvFilter::try_new(level),
        None => EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(configured.unwrap_or(DEFAULT_LEVEL))),
    }
    .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .is_ok();
    if !installed {
        tracing::trace!("global subscriber already installed, keeping it");
    }
    installed
}
