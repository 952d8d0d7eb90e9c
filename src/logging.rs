// src/logging.rs
// =============================================================================
// Log setup.
//
// Logs go to stderr so stdout only ever carries the corpus (or JSON).
// RUST_LOG wins when set; otherwise we log our own crate at info, or at
// debug with --verbose.
// =============================================================================

use tracing_subscriber::EnvFilter;

pub fn init(verbose: bool) {
    let default_directive = if verbose {
        "site_corpus=debug"
    } else {
        "site_corpus=info"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    // try_init: a second call (e.g. from tests) leaves the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
