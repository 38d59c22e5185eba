//! Tracing initialization shared by the pipeline binaries.

use tracing_subscriber::EnvFilter;

/// Set up tracing with a human-readable stderr layer.
///
/// Verbosity maps -v counts to filter levels; an explicit `RUST_LOG` takes
/// precedence over the computed default.
pub fn init(verbose: u8, quiet: bool) {
    let filter = match verbose {
        0 if quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .init();
}
