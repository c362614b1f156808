use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub mod formatter;

pub use formatter::*;

use crate::common::types::AnyResult;
use crate::configs::Config;

/// Build the filter directive string from the logging section of `config`.
pub fn filter_directives(config: &Config) -> String {
    let log_level = config
        .logging
        .as_ref()
        .and_then(|l| l.level.as_deref())
        .unwrap_or("info");

    let filters = config
        .logging
        .as_ref()
        .and_then(|l| l.filters.as_deref())
        .unwrap_or("");

    if filters.is_empty() {
        log_level.to_string()
    } else {
        format!("{},{}", log_level, filters)
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
pub fn init(config: &Config) -> AnyResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(config)));

    let use_ansi = config
        .logging
        .as_ref()
        .map(|l| l.ansi)
        .unwrap_or(true);

    let stdout_layer = fmt::layer()
        .event_format(CustomFormatter::new(use_ansi))
        .with_ansi(use_ansi);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .try_init()?;

    Ok(())
}
