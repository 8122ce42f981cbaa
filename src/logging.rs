//! Logging initialization
//!
//! Diagnostics go to stderr through `tracing`, leaving stdout to the console.

use tracing_subscriber::EnvFilter;

/// Filter directive for a `-v` count
fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "hbnb=warn",
        1 => "hbnb=info",
        2 => "hbnb=debug",
        _ => "hbnb=trace",
    }
}

/// Initialize the tracing subscriber. `RUST_LOG` overrides the verbosity flag.
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    // A subscriber may already be installed (tests); keep the existing one
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
