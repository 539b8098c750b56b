//! chain_inspector library: TLS certificate chain retrieval and decoding
//!
//! Connects to a TLS endpoint without evaluating trust, collects the
//! certificate chain the peer presents, and decodes every certificate into a
//! structured record (names, validity, serial, fingerprint, SANs, signature
//! algorithm, key type and size) plus a countdown to leaf expiry.
//!
//! # Example
//!
//! ```no_run
//! use chain_inspector::{InspectRequest, Inspector, InspectorConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let inspector = Inspector::new(InspectorConfig::default())?;
//! let request: InspectRequest = serde_json::from_str(r#"{"host": "example.com"}"#)?;
//!
//! match inspector.inspect(&request).await {
//!     Ok(result) => println!("{}", serde_json::to_string_pretty(&result)?),
//!     Err(e) => eprintln!("{}: {e}", e.kind()),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

#![warn(missing_docs)]

pub mod app;
pub mod config;
mod error_handling;
pub mod initialization;
mod models;
mod tls;

// Re-export public API
pub use config::{InspectorConfig, LogFormat, LogLevel, TrustMode};
pub use error_handling::{
    ConnectStage, ErrorDescriptor, ErrorKind, InitializationError, InspectError,
};
pub use models::{ChainRequest, InspectRequest, InspectionResult, ParsedCertificate, PublicKeySize};
pub use run::run_inspections;
pub use tls::{
    days_remaining, format_fingerprint, parse_certificate, walk, Connector, InspectionState,
    Inspector, PeerCertificateNode, PresentedChain,
};

// Batch execution used by the CLI
mod run {
    use futures::stream::{self, StreamExt};
    use log::info;

    use crate::app::Outcome;
    use crate::error_handling::InspectError;
    use crate::models::InspectRequest;
    use crate::tls::Inspector;

    /// Inspects every request with at most `max_concurrency` in flight.
    ///
    /// Requests that already failed to parse are reported as failures without
    /// touching the network.
    ///
    /// # Arguments
    ///
    /// * `inspector` - Shared inspector; holds no per-request state
    /// * `requests` - Parsed payloads, or the error each one failed with
    /// * `max_concurrency` - Upper bound on inspections in flight (at least 1)
    ///
    /// # Returns
    ///
    /// One [`Outcome`] per request, in input order.
    pub async fn run_inspections(
        inspector: &Inspector,
        requests: Vec<Result<InspectRequest, InspectError>>,
        max_concurrency: usize,
    ) -> Vec<Outcome> {
        let total = requests.len();
        let start = std::time::Instant::now();

        let outcomes: Vec<Outcome> = stream::iter(requests)
            .map(|request| async move {
                match request {
                    Ok(request) => match inspector.inspect(&request).await {
                        Ok(result) => Outcome::Success(result),
                        Err(e) => Outcome::failure(Some(&request), &e),
                    },
                    Err(e) => Outcome::failure(None, &e),
                }
            })
            .buffered(max_concurrency.max(1))
            .collect()
            .await;

        let failed = outcomes.iter().filter(|o| o.is_failure()).count();
        info!(
            "Inspected {} target{} ({} succeeded, {} failed) in {:.2}s",
            total,
            if total == 1 { "" } else { "s" },
            total - failed,
            failed,
            start.elapsed().as_secs_f64()
        );
        outcomes
    }
}
