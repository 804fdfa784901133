//! Tracing setup.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g.
/// `ESTIMATE_LOG=estimate_core=debug`
pub const LOG_ENV: &str = "ESTIMATE_LOG";

/// Filter directive for a `-v` count
fn directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the stderr subscriber.
///
/// `-v` flags win over `ESTIMATE_LOG`; with neither, only warnings show.
pub fn init(verbose: u8) {
    let filter = if verbose > 0 {
        EnvFilter::new(directive(verbose))
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(directive(0)))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose > 1)
        .with_writer(std::io::stderr)
        .init();
}
