//! Main application modules.
//!
//! This module provides target parsing and output rendering used by the
//! `chain_inspector` binary.

pub mod report;
pub mod targets;

// Re-export public API
pub use report::{render, Outcome};
pub use targets::{parse_target, read_requests};
