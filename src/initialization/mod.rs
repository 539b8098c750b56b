//! Application initialization.
//!
//! This module provides process-wide set-up performed once by the binary:
//! - Logger (plain or JSON, level override over `RUST_LOG`)
//! - rustls client configuration (crypto provider, protocol versions, trust mode)
//!
//! All initialization functions return `InitializationError` on failure.

mod logger;
mod tls;

// Re-export public API
pub use logger::init_logger_with;
pub use tls::init_client_config;
