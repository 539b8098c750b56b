//! Configuration constants.
//!
//! This module defines the operational defaults used throughout the inspector:
//! timeouts, input limits and CLI concurrency.

/// Default TLS port when a request does not name one.
pub const DEFAULT_PORT: u16 = 443;

/// Maximum length of a host or SNI value (the DNS name length limit).
pub const MAX_HOST_LENGTH: usize = 253;

/// Combined DNS + TCP connect + TLS handshake budget in seconds.
///
/// One timer bounds the whole connection phase. When it fires the in-flight
/// future is dropped, which closes the socket.
pub const DEFAULT_INSPECT_TIMEOUT_SECS: u64 = 10;

/// Number of inspections the CLI runs at once.
pub const DEFAULT_MAX_CONCURRENCY: usize = 16;

/// Milliseconds in one day, used by the expiry countdown.
pub const MILLIS_PER_DAY: i64 = 86_400_000;
