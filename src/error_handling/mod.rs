//! Error handling.
//!
//! This module provides:
//! - The inspection error taxonomy (`InspectError` and its `ErrorKind` tags)
//! - The connection stage a network failure happened in
//! - The serializable `ErrorDescriptor` returned to callers
//! - Initialization errors
//!
//! Every inspection error is terminal for that inspection.

mod descriptor;
mod types;

// Re-export public API
pub use descriptor::ErrorDescriptor;
pub use types::{ConnectStage, ErrorKind, InitializationError, InspectError};
