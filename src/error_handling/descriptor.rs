//! Serializable error descriptor handed to the response layer.

use serde::Serialize;

use super::types::{ErrorKind, InspectError};

/// Kind tag plus human message, the outbound shape of a failed inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDescriptor {
    /// Which of the five failure kinds occurred
    pub kind: ErrorKind,
    /// Message suitable for showing to the requester
    pub message: String,
}

impl From<&InspectError> for ErrorDescriptor {
    fn from(err: &InspectError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<InspectError> for ErrorDescriptor {
    fn from(err: InspectError) -> Self {
        Self::from(&err)
    }
}
