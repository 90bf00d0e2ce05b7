//! Log subscriber setup
//!
//! Logs always go to stderr so results on stdout stay machine readable.
//! `RUST_LOG` overrides the level implied by `-q`/`-v`, e.g.
//! `RUST_LOG=semloc::batch=trace`.

use crate::config::CliConfig;
use tracing_subscriber::EnvFilter;

/// The filter for `config`, preferring `RUST_LOG` when it parses
#[must_use]
pub fn filter_for(config: &CliConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.verbosity.log_directive()))
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init_logging(config: &CliConfig) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter_for(config))
        .with_target(true)
        .with_writer(std::io::stderr);
    let installed = if config.json_logs {
        builder.json().try_init()
    } else {
        builder.with_ansi(config.color.should_color()).try_init()
    };
    if installed.is_ok() {
        tracing::debug!(verbosity = ?config.verbosity, json = config.json_logs, "logging initialized");
    }
}
