use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,databall=debug";

/// Installs the global fmt subscriber. `RUST_LOG` overrides the default
/// filter. Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
