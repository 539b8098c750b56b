//! Logger initialization.
//!
//! Records go to stderr, either as colored text or as one JSON object per line.
//! Module paths inside this crate are shortened to `tls::connector` style.

use std::io::Write;

use chrono::Utc;
use colored::{ColoredString, Colorize};
use log::{Level, LevelFilter, Record};
use serde_json::json;

use crate::config::LogFormat;
use crate::error_handling::InitializationError;

/// Initializes the logger with the specified level and format.
///
/// Configures `env_logger` with either colored plain text or one JSON object
/// per line. `RUST_LOG` is read first and the provided `level` overrides it.
/// rustls and tokio-rustls are capped at warn.
///
/// # Arguments
///
/// * `level` - Minimum level for this crate's records
/// * `format` - Plain or JSON output
///
/// # Returns
///
/// `Ok(())` once the global logger is installed.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
///
/// # Examples
///
/// ```bash
/// # Quick debugging without CLI args
/// RUST_LOG=debug chain_inspector example.com
///
/// # CLI level takes precedence
/// RUST_LOG=debug chain_inspector example.com --log-level info
/// ```
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    let mut builder = env_logger::Builder::from_default_env();

    builder.filter_level(level);
    for module in QUIET_MODULES {
        builder.filter_module(module, LevelFilter::Warn);
    }
    builder.filter_module(CRATE_TARGET, level);
    // stdout carries the inspection results
    builder.target(env_logger::Target::Stderr);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                writeln!(buf, "{}", json_line(record, Utc::now().timestamp_millis()))
            });
        }
        LogFormat::Plain => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{} [{}] {}",
                    short_target(record.target()).cyan(),
                    colored_level(record.level()),
                    record.args()
                )
            });
        }
    }

    builder.try_init().map_err(InitializationError::from)?;

    Ok(())
}

/// Crate whose records follow the requested level.
const CRATE_TARGET: &str = "chain_inspector";

/// Dependencies that log every handshake step and alert at debug.
const QUIET_MODULES: &[&str] = &["rustls", "tokio_rustls"];

/// Module path relative to this crate (`tls::connector`); dependency targets
/// are left as they are.
fn short_target(target: &str) -> &str {
    target
        .strip_prefix(CRATE_TARGET)
        .and_then(|rest| rest.strip_prefix("::"))
        .unwrap_or(target)
}

fn colored_level(level: Level) -> ColoredString {
    let label = level.as_str();
    match level {
        Level::Error => label.red().bold(),
        Level::Warn => label.yellow(),
        Level::Info => label.green(),
        Level::Debug => label.blue(),
        Level::Trace => label.purple(),
    }
}

/// One JSON object per record: epoch milliseconds, level, module and message.
fn json_line(record: &Record<'_>, ts_millis: i64) -> String {
    json!({
        "ts": ts_millis,
        "level": record.level().as_str(),
        "module": short_target(record.target()),
        "msg": record.args().to_string(),
    })
    .to_string()
}
