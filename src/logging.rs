//! Structured logging setup.
//!
//! Logs go to stderr so rendered output on stdout stays clean. The level
//! comes from `--log-level`, then `-v` / `-q`, then `TEMPLATIZE_LOG_LEVEL`;
//! `RUST_LOG` overrides all of them when set.

use std::env;
use std::sync::Once;

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Parses a log level (case-insensitive), falling back to WARN.
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to WARN. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::WARN
        }
    }
}

/// Pick the level from CLI flags and the environment.
pub fn level_from_flags(log_level: Option<&str>, verbose: bool, quiet: bool) -> Level {
    if let Some(level_str) = log_level {
        parse_level(level_str)
    } else if verbose {
        Level::DEBUG
    } else if quiet {
        Level::ERROR
    } else {
        env::var("TEMPLATIZE_LOG_LEVEL")
            .map(|s| parse_level(&s))
            .unwrap_or(Level::WARN)
    }
}

/// Install the global subscriber. Only the first call has any effect.
pub fn init(level: Level) {
    INIT.call_once(|| {
        let filter = if env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(format!("templatize={}", level.as_str().to_ascii_lowercase()))
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    });
}
