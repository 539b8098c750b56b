//! TLS certificate chain inspection.
//!
//! This module connects to a TLS endpoint and decodes the chain it presents:
//! - Subject and issuer names
//! - Validity window and leaf expiry countdown
//! - Serial number and SHA-256 fingerprint
//! - Subject Alternative Names (SANs)
//! - Signature algorithm, key family and key size or curve
//!
//! Uses `tokio-rustls` for the handshake and `x509-parser` for decoding. An
//! inspection moves through Connecting, Walking, Parsing and Done; any stage
//! can end it in Failed, and nothing is retried.

mod chain;
mod connector;
mod expiry;
mod extract;

use std::fmt;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::config::InspectorConfig;
use crate::error_handling::{InitializationError, InspectError};
use crate::models::{ChainRequest, InspectRequest, InspectionResult, ParsedCertificate};

pub use chain::{format_fingerprint, walk, PeerCertificateNode, PresentedChain};
pub use connector::Connector;
pub(crate) use connector::InspectOnlyVerifier;
pub use expiry::days_remaining;
pub use extract::parse_certificate;

/// Stage an inspection is in, used for progress logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectionState {
    /// Resolving, connecting and handshaking
    Connecting,
    /// Following issuer links through the presented chain
    Walking,
    /// Decoding each certificate
    Parsing,
    /// Result assembled
    Done,
    /// Terminated by an error
    Failed,
}

impl fmt::Display for InspectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InspectionState::Connecting => "connecting",
            InspectionState::Walking => "walking chain",
            InspectionState::Parsing => "parsing certificates",
            InspectionState::Done => "done",
            InspectionState::Failed => "failed",
        })
    }
}

/// Retrieves and decodes certificate chains.
///
/// Holds no per-inspection state, so one `Inspector` can serve any number of
/// concurrent inspections.
///
/// # Example
///
/// ```no_run
/// use chain_inspector::{InspectRequest, Inspector, InspectorConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let inspector = Inspector::new(InspectorConfig::default())?;
/// let request = InspectRequest {
///     host: "example.com".into(),
///     ..Default::default()
/// };
/// let result = inspector.inspect(&request).await?;
/// println!("{} days left on {}", result.days_remaining, result.chain[0].subject);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Inspector {
    connector: Connector,
}

impl Inspector {
    /// Creates an inspector from its configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Timeout budget and trust mode
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::TlsConfigError` if the TLS client
    /// configuration cannot be built.
    pub fn new(config: InspectorConfig) -> Result<Self, InitializationError> {
        Ok(Self {
            connector: Connector::new(&config)?,
        })
    }

    /// Validates an inbound payload and inspects it.
    ///
    /// # Errors
    ///
    /// `InvalidInput` before any network I/O if host, port or SNI are
    /// malformed, otherwise any error of [`Inspector::inspect_chain`].
    pub async fn inspect(&self, request: &InspectRequest) -> Result<InspectionResult, InspectError> {
        let request = request.validate().inspect_err(|e| {
            warn!("Rejected request for '{}': {e}", request.host);
        })?;
        self.inspect_chain(&request).await
    }

    /// Inspects a validated request. The whole chain is decoded or the call fails.
    ///
    /// # Arguments
    ///
    /// * `request` - Validated host, port and SNI
    ///
    /// # Returns
    ///
    /// The decoded chain in issuer order, leaf first, with the leaf's days
    /// until expiry.
    ///
    /// # Errors
    ///
    /// - `ConnectionTimeout` or `ConnectionFailed` from the connector
    /// - `NoCertificatePresented` if the peer sent an empty certificate list
    /// - `CertificateParseError` naming the first certificate that did not decode
    pub async fn inspect_chain(
        &self,
        request: &ChainRequest,
    ) -> Result<InspectionResult, InspectError> {
        let target = request.target();
        let result = self.run(request, &target).await;
        match &result {
            Ok(inspection) => info!(
                "{target}: {} certificate(s), leaf expires in {} day(s)",
                inspection.chain.len(),
                inspection.days_remaining
            ),
            Err(e) => warn!("{target}: {} ({}): {e}", InspectionState::Failed, e.kind()),
        }
        result
    }

    async fn run(
        &self,
        request: &ChainRequest,
        target: &str,
    ) -> Result<InspectionResult, InspectError> {
        debug!("{target}: {}", InspectionState::Connecting);
        let presented = self.connector.connect(request).await?;

        debug!("{target}: {}", InspectionState::Walking);
        let walked = walk(&presented);

        debug!("{target}: {}", InspectionState::Parsing);
        let chain = parse_chain(&walked)?;

        let result = assemble(request, chain, Utc::now()).ok_or_else(|| {
            InspectError::NoCertificatePresented {
                target: target.to_string(),
            }
        })?;
        debug!("{target}: {}", InspectionState::Done);
        Ok(result)
    }
}

/// Decodes every walked certificate, failing on the first one that does not decode.
fn parse_chain(walked: &[&[u8]]) -> Result<Vec<ParsedCertificate>, InspectError> {
    walked
        .iter()
        .enumerate()
        .map(|(index, der)| {
            parse_certificate(der).map_err(|e| InspectError::CertificateParseError {
                index,
                message: format!("{e:#}"),
            })
        })
        .collect()
}

/// Builds the result record. `None` when the chain is empty.
fn assemble(
    request: &ChainRequest,
    chain: Vec<ParsedCertificate>,
    now: DateTime<Utc>,
) -> Option<InspectionResult> {
    let days = days_remaining(chain.first()?.valid_to, now);
    Some(InspectionResult {
        host: request.host().to_string(),
        port: request.port(),
        sni: request.sni().to_string(),
        days_remaining: days,
        chain,
    })
}
