//! Logging setup for the binary
//!
//! `RUST_LOG` wins when set; otherwise the level comes from the `-v` count.
//! Output goes to stderr so stdout stays clean JSON.

use tracing_subscriber::{fmt, EnvFilter};

/// Map a `-v` count to a filter directive
pub fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber; later calls keep the first one
pub fn init(verbosity: u8) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for_verbosity(verbosity)));
    let builder = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if let Err(err) = builder.try_init() {
        eprintln!("failed to install tracing subscriber: {err}");
    }
}
