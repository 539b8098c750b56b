//! Configuration types and CLI options.
//!
//! This module defines the enums and structs used for command-line argument
//! parsing and for configuring an [`Inspector`](crate::Inspector).

use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::{DEFAULT_INSPECT_TIMEOUT_SECS, DEFAULT_MAX_CONCURRENCY, DEFAULT_PORT};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// How the connector treats the certificate chain the peer presents.
///
/// Inspection and verification are separate operating modes rather than a
/// flag on one mode: an `InspectOnly` connection never evaluates trust, a
/// `WebPki` connection is an ordinary validating client.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum TrustMode {
    /// Accept any certificate: self-signed, expired, wrong host, unknown issuer.
    #[default]
    InspectOnly,
    /// Validate against the bundled Mozilla root set; trust failures abort the handshake.
    WebPki,
}

/// Library configuration for an [`Inspector`](crate::Inspector).
///
/// # Examples
///
/// ```
/// use chain_inspector::{InspectorConfig, TrustMode};
/// use std::time::Duration;
///
/// let config = InspectorConfig {
///     timeout: Duration::from_secs(5),
///     ..Default::default()
/// };
/// assert_eq!(config.trust_mode, TrustMode::InspectOnly);
/// ```
#[derive(Debug, Clone)]
pub struct InspectorConfig {
    /// Budget for DNS resolution, TCP connect and TLS handshake combined
    pub timeout: Duration,

    /// Certificate handling mode of the connector
    pub trust_mode: TrustMode,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_INSPECT_TIMEOUT_SECS),
            trust_mode: TrustMode::InspectOnly,
        }
    }
}

/// Command-line options for the `chain_inspector` binary.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "chain_inspector",
    about = "Retrieve and decode the TLS certificate chain a server presents"
)]
pub struct Opt {
    /// Targets to inspect, as `host` or `host:port`
    #[arg(value_name = "TARGET")]
    pub targets: Vec<String>,

    /// Port used for targets that do not carry one
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Server name indication to send (defaults to each target's host)
    #[arg(long)]
    pub sni: Option<String>,

    /// Read newline-delimited JSON requests (`{"host", "port", "sni"}`) from stdin
    #[arg(long)]
    pub stdin: bool,

    /// Combined connect and handshake timeout in seconds
    #[arg(long, default_value_t = DEFAULT_INSPECT_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// Certificate handling mode
    #[arg(long, value_enum, default_value_t = TrustMode::InspectOnly)]
    pub trust_mode: TrustMode,

    /// Maximum number of inspections running at once
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
    pub max_concurrency: usize,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Opt {
    /// Builds the library configuration these options describe.
    pub fn inspector_config(&self) -> InspectorConfig {
        InspectorConfig {
            timeout: Duration::from_secs(self.timeout_seconds),
            trust_mode: self.trust_mode,
        }
    }
}
