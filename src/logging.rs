//! Tracing subscriber setup.
//!
//! Logs go to stderr so they never interleave with tables or CSV written to stdout.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (e.g. `FCAST_LOG=debug`).
pub const LOG_ENV: &str = "FCAST_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber. Safe to call more than once; later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
