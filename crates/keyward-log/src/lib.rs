// ABOUTME: Shared logging setup for keyward binaries
// ABOUTME: Logs go to stderr so listings on stdout stay clean

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Level used when RUST_LOG is unset.
pub fn default_level(verbose: bool) -> Level {
    if verbose {
        Level::DEBUG
    } else {
        Level::WARN
    }
}

/// Logging to stderr. Default: WARN, or DEBUG when verbose. RUST_LOG overrides.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose).as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
