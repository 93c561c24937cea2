//! `bv`: inspect boardview listings from JSON exports.

#![forbid(unsafe_code)]

use boardview_core::Config;
use tracing_subscriber::EnvFilter;

fn main() {
    let config = Config::from_env();

    // Logs go to stderr so JSON output on stdout stays parseable.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    std::process::exit(boardview_cli::run(config));
}
