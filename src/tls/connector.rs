//! TLS connection establishment for chain retrieval.
//!
//! Resolves the host, opens a TCP connection and runs a rustls handshake
//! advertising the requested SNI, all under one timeout. Only the certificates
//! the peer presents are kept; no application data is exchanged.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, SignatureScheme};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

use crate::config::InspectorConfig;
use crate::error_handling::{ConnectStage, InitializationError, InspectError};
use crate::initialization::init_client_config;
use crate::models::ChainRequest;
use crate::tls::chain::PresentedChain;

/// Opens TLS sessions and hands back the presented certificate chain.
///
/// The rustls client configuration is built once, when the connector is
/// created, and shared by every connection it opens.
///
/// # Protocol versions
///
/// rustls implements TLS 1.2 and TLS 1.3 only, and both are offered. A peer
/// that speaks nothing newer than TLS 1.1 (or SSLv3) cannot be inspected: the
/// handshake fails and the error is reported as
/// `ConnectionFailed { stage: Handshake, .. }`.
#[derive(Debug, Clone)]
pub struct Connector {
    timeout: Duration,
    client_config: Arc<ClientConfig>,
}

impl Connector {
    /// Creates a connector with the configured timeout and trust mode.
    ///
    /// # Arguments
    ///
    /// * `config` - Timeout budget and trust mode
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::TlsConfigError` if the rustls client
    /// configuration cannot be built.
    pub fn new(config: &InspectorConfig) -> Result<Self, InitializationError> {
        Ok(Self {
            timeout: config.timeout,
            client_config: init_client_config(config.trust_mode)?,
        })
    }

    /// Connects to `host:port`, performs the handshake and returns the chain.
    ///
    /// DNS resolution, TCP connect and handshake share a single timeout. When
    /// it fires the in-flight connection is dropped, closing the socket.
    ///
    /// # Arguments
    ///
    /// * `request` - Validated host, port and SNI
    ///
    /// # Returns
    ///
    /// The presented certificates as an arena with issuer links resolved.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the SNI is not a usable server name
    /// - `ConnectionTimeout` if the budget is exceeded
    /// - `ConnectionFailed` for DNS, TCP or handshake failures
    /// - `NoCertificatePresented` if the peer sent an empty certificate list
    pub async fn connect(&self, request: &ChainRequest) -> Result<PresentedChain, InspectError> {
        let target = request.target();
        let server_name = ServerName::try_from(request.sni().to_string()).map_err(|e| {
            InspectError::invalid_input(format!("sni '{}' is not a valid server name: {e}", request.sni()))
        })?;
        if matches!(server_name, ServerName::IpAddress(_)) {
            debug!("SNI for {target} is an IP address, no server name indication will be sent");
        }

        let outcome =
            tokio::time::timeout(self.timeout, self.establish(request, server_name, &target)).await;
        match outcome {
            Ok(result) => result,
            Err(_) => {
                warn!("Connection to {target} timed out after {:?}", self.timeout);
                Err(InspectError::ConnectionTimeout {
                    target,
                    timeout: self.timeout,
                })
            }
        }
    }

    async fn establish(
        &self,
        request: &ChainRequest,
        server_name: ServerName<'static>,
        target: &str,
    ) -> Result<PresentedChain, InspectError> {
        debug!("Resolving {}", request.host());
        let addrs: Vec<SocketAddr> = tokio::net::lookup_host((request.host(), request.port()))
            .await
            .map_err(|e| InspectError::connection_failed(ConnectStage::Dns, target, e.to_string()))?
            .collect();
        if addrs.is_empty() {
            return Err(InspectError::connection_failed(
                ConnectStage::Dns,
                target,
                "host resolved to no addresses",
            ));
        }

        let sock = connect_tcp(&addrs, target).await?;

        debug!("Starting TLS handshake with {target} (sni {})", request.sni());
        let connector = TlsConnector::from(Arc::clone(&self.client_config));
        let tls_stream = connector
            .connect(server_name, sock)
            .await
            .map_err(|e| handshake_error(e, target))?;

        let (_, session) = tls_stream.get_ref();
        debug!(
            "Negotiated {} / {} with {target}",
            session
                .protocol_version()
                .map(|v| format!("{v:?}"))
                .unwrap_or_else(|| "Unknown".to_string()),
            session
                .negotiated_cipher_suite()
                .map(|cs| format!("{:?}", cs.suite()))
                .unwrap_or_else(|| "Unknown".to_string()),
        );

        let presented: Vec<CertificateDer<'static>> = session
            .peer_certificates()
            .map(|certs| certs.to_vec())
            .unwrap_or_default();
        drop(tls_stream);

        // rustls rejects an empty Certificate message during the handshake; this
        // covers a session that completes without recording one.
        if presented.is_empty() {
            return Err(InspectError::NoCertificatePresented {
                target: target.to_string(),
            });
        }
        debug!("{target} presented {} certificate(s)", presented.len());

        Ok(PresentedChain::from_presented(presented))
    }
}

/// Classifies a failed handshake. tokio-rustls wraps the rustls error in an
/// `io::Error`; an empty certificate list gets its own kind.
fn handshake_error(err: io::Error, target: &str) -> InspectError {
    let cause = err
        .get_ref()
        .and_then(|inner| inner.downcast_ref::<rustls::Error>());
    if matches!(cause, Some(rustls::Error::NoCertificatesPresented)) {
        warn!("{target} completed the TLS exchange without a certificate");
        return InspectError::NoCertificatePresented {
            target: target.to_string(),
        };
    }
    InspectError::connection_failed(ConnectStage::Handshake, target, err.to_string())
}

async fn connect_tcp(addrs: &[SocketAddr], target: &str) -> Result<TcpStream, InspectError> {
    let mut last_error = None;
    for addr in addrs {
        match TcpStream::connect(*addr).await {
            Ok(sock) => return Ok(sock),
            Err(e) => {
                debug!("TCP connect to {addr} for {target} failed: {e}");
                last_error = Some(e);
            }
        }
    }
    let message = last_error
        .map(|e| e.to_string())
        .unwrap_or_else(|| "no address accepted the connection".to_string());
    Err(InspectError::connection_failed(ConnectStage::Tcp, target, message))
}

/// Server certificate verifier for [`TrustMode::InspectOnly`].
///
/// Accepts every chain and every handshake signature: the connection exists
/// only to read the certificates, never to trust the peer.
#[derive(Debug)]
pub(crate) struct InspectOnlyVerifier {
    schemes: Vec<SignatureScheme>,
}

impl InspectOnlyVerifier {
    pub(crate) fn new(provider: &CryptoProvider) -> Self {
        Self {
            schemes: provider.signature_verification_algorithms.supported_schemes(),
        }
    }
}

impl ServerCertVerifier for InspectOnlyVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.schemes.clone()
    }
}
