//! Output records for the CLI.

use serde::Serialize;

use crate::error_handling::{ErrorDescriptor, InspectError};
use crate::models::{InspectRequest, InspectionResult};

/// What happened to one target.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    /// The chain was retrieved and decoded
    Success(InspectionResult),
    /// The inspection failed
    Failure {
        /// Host as requested, absent when the request itself was unreadable
        #[serde(skip_serializing_if = "Option::is_none")]
        host: Option<String>,
        /// Port as requested
        #[serde(skip_serializing_if = "Option::is_none")]
        port: Option<i64>,
        /// Kind and message
        error: ErrorDescriptor,
    },
}

impl Outcome {
    /// Wraps a failed inspection together with what was asked for.
    pub fn failure(request: Option<&InspectRequest>, err: &InspectError) -> Self {
        Outcome::Failure {
            host: request.map(|r| r.host.clone()),
            port: request.and_then(|r| r.port),
            error: ErrorDescriptor::from(err),
        }
    }

    /// Whether this target failed.
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure { .. })
    }
}

/// Renders an outcome as one JSON document.
pub fn render(outcome: &Outcome, pretty: bool) -> String {
    let rendered = if pretty {
        serde_json::to_string_pretty(outcome)
    } else {
        serde_json::to_string(outcome)
    };
    rendered.unwrap_or_else(|_| "{}".to_string())
}
