//! Tracing setup for the command-line tool.

use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "mongeez_autoconfig=info,mongeez_runner=info";
const VERBOSE_LOG_FILTER: &str = "mongeez_autoconfig=debug,mongeez_runner=debug";

/// Install a stderr subscriber. `RUST_LOG` takes precedence over `verbose`.
pub fn init_logging(verbose: bool) {
    let fallback = if verbose { VERBOSE_LOG_FILTER } else { DEFAULT_LOG_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // A subscriber may already be installed (e.g. by an embedding binary).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
