//! Logging setup.
//!
//! All modules log through the `log` facade. Output goes to stderr through
//! `env_logger`, so stdout stays clean when the tool is used in scripts.
//!
//! Precedence: `--log-level` flag, then the config file's `log_level`, then
//! `RUST_LOG`, then warnings only.

use env_logger::{Builder, Env};

use crate::config::LogLevel;

/// Pick the effective level from the CLI flag and the config value.
///
/// `None` means neither was set and `RUST_LOG` decides.
pub fn effective_level(cli: Option<LogLevel>, config: Option<LogLevel>) -> Option<LogLevel> {
    cli.or(config)
}

/// Install the global logger. Safe to call more than once; later calls are
/// ignored.
pub fn init(level: Option<LogLevel>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));
    if let Some(level) = level {
        builder.filter_level(level.to_level_filter());
    }
    builder.format_timestamp_millis();

    if builder.try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}
