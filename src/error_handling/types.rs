//! Error type definitions.
//!
//! This module defines the inspection error taxonomy and initialization errors.

use std::time::Duration;

use log::SetLoggerError;
use serde::Serialize;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error building the rustls client configuration.
    #[error("TLS client configuration error: {0}")]
    TlsConfigError(#[from] rustls::Error),
}

/// Phase of connection establishment in which a non-timeout failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConnectStage {
    /// Host name could not be resolved to any address.
    Dns,
    /// TCP connection refused, reset or unreachable.
    Tcp,
    /// TLS negotiation failed (protocol mismatch, alert, plain-text service).
    Handshake,
}

impl std::fmt::Display for ConnectStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ConnectStage::Dns => "DNS resolution",
            ConnectStage::Tcp => "TCP connection",
            ConnectStage::Handshake => "TLS handshake",
        })
    }
}

/// Stable tag identifying which kind of failure an inspection hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumIterMacro)]
pub enum ErrorKind {
    /// Host, port or SNI failed structural validation.
    InvalidInput,
    /// Connect plus handshake exceeded the timeout budget.
    ConnectionTimeout,
    /// DNS, TCP or TLS failure other than a timeout.
    ConnectionFailed,
    /// The handshake completed but the peer sent no certificate.
    NoCertificatePresented,
    /// A certificate in the presented chain could not be decoded.
    CertificateParseError,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorKind {
    /// Returns the tag used in serialized error descriptors.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "InvalidInput",
            ErrorKind::ConnectionTimeout => "ConnectionTimeout",
            ErrorKind::ConnectionFailed => "ConnectionFailed",
            ErrorKind::NoCertificatePresented => "NoCertificatePresented",
            ErrorKind::CertificateParseError => "CertificateParseError",
        }
    }
}

/// Errors that terminate a single inspection.
///
/// None of these are retried internally; the caller decides whether to try again.
#[derive(Error, Debug)]
pub enum InspectError {
    /// Request rejected before any network I/O.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// What was wrong with the request
        message: String,
    },

    /// The connection phase did not finish within the budget.
    #[error("Connection to {target} timed out after {timeout:?}")]
    ConnectionTimeout {
        /// `host:port` being inspected
        target: String,
        /// Budget that was exceeded
        timeout: Duration,
    },

    /// DNS, TCP or TLS failure.
    #[error("{stage} failed for {target}: {message}")]
    ConnectionFailed {
        /// Phase that failed
        stage: ConnectStage,
        /// `host:port` being inspected
        target: String,
        /// Human-readable cause
        message: String,
    },

    /// Handshake succeeded without any peer certificate.
    #[error("{target} completed the handshake without presenting a certificate")]
    NoCertificatePresented {
        /// `host:port` being inspected
        target: String,
    },

    /// One certificate of the chain could not be decoded.
    #[error("Certificate {index} of the presented chain could not be decoded: {message}")]
    CertificateParseError {
        /// Position in the walked chain (0 = leaf)
        index: usize,
        /// Decoder diagnostic
        message: String,
    },
}

impl InspectError {
    /// Returns the kind tag for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            InspectError::InvalidInput { .. } => ErrorKind::InvalidInput,
            InspectError::ConnectionTimeout { .. } => ErrorKind::ConnectionTimeout,
            InspectError::ConnectionFailed { .. } => ErrorKind::ConnectionFailed,
            InspectError::NoCertificatePresented { .. } => ErrorKind::NoCertificatePresented,
            InspectError::CertificateParseError { .. } => ErrorKind::CertificateParseError,
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        InspectError::InvalidInput {
            message: message.into(),
        }
    }

    pub(crate) fn connection_failed(
        stage: ConnectStage,
        target: &str,
        message: impl Into<String>,
    ) -> Self {
        InspectError::ConnectionFailed {
            stage,
            target: target.to_string(),
            message: message.into(),
        }
    }
}
