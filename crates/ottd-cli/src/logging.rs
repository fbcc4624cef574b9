use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::error::{CliError, Result};

/// Install the global tracing subscriber.
///
/// Logs go to stderr so command output on stdout stays clean. The level
/// comes from `RUST_LOG`, defaulting to `info`; `verbose` forces `debug`.
pub fn init(verbose: bool) -> Result<()> {
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .compact();

    let filter_layer = filter(verbose).map_err(|e| CliError::Logging {
        message: e.to_string(),
    })?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| CliError::Logging {
            message: e.to_string(),
        })
}

fn filter(verbose: bool) -> std::result::Result<EnvFilter, tracing_subscriber::filter::ParseError> {
    if verbose {
        return EnvFilter::try_new("debug");
    }
    EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))
}
