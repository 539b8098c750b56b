// Shared test helpers for minting certificates and serving them over TLS.
//
// Certificates are generated with rcgen (ECDSA P-256 unless noted) and served by
// a local tokio-rustls acceptor bound to 127.0.0.1 on an ephemeral port.

#![allow(dead_code)] // Each test file uses a different subset

use std::net::SocketAddr;
use std::sync::Arc;

use rcgen::{
    BasicConstraints, Certificate, CertificateParams, DistinguishedName, DnType, IsCa, KeyPair,
    PKCS_ED25519,
};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::server::{ClientHello, ResolvesServerCert};
use rustls::sign::CertifiedKey;
use rustls::ServerConfig;
use time::{Duration, OffsetDateTime};
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;

/// A certificate together with the key it certifies.
pub struct Issued {
    pub cert: Certificate,
    pub key: KeyPair,
}

impl Issued {
    pub fn der(&self) -> CertificateDer<'static> {
        self.cert.der().clone()
    }
}

fn params(cn: &str, sans: &[&str], ca: bool) -> CertificateParams {
    let sans: Vec<String> = sans.iter().map(|s| s.to_string()).collect();
    let mut params = CertificateParams::new(sans).expect("valid SAN list");
    params.distinguished_name = DistinguishedName::new();
    params.distinguished_name.push(DnType::CommonName, cn);
    params.is_ca = if ca {
        IsCa::Ca(BasicConstraints::Unconstrained)
    } else {
        IsCa::NoCa
    };
    let now = OffsetDateTime::now_utc();
    params.not_before = now - Duration::days(1);
    params.not_after = now + Duration::days(90);
    params
}

/// Self-signed end-entity certificate valid from `not_before` to `not_after`.
pub fn self_signed(
    cn: &str,
    sans: &[&str],
    not_before: OffsetDateTime,
    not_after: OffsetDateTime,
) -> Issued {
    let mut params = params(cn, sans, false);
    params.not_before = not_before;
    params.not_after = not_after;
    let key = KeyPair::generate().expect("key generation");
    let cert = params.self_signed(&key).expect("self-signed certificate");
    Issued { cert, key }
}

/// Self-signed end-entity certificate with an Ed25519 key, valid for 90 days.
pub fn self_signed_ed25519(cn: &str, sans: &[&str]) -> Issued {
    let key = KeyPair::generate_for(&PKCS_ED25519).expect("ed25519 key generation");
    let cert = params(cn, sans, false)
        .self_signed(&key)
        .expect("self-signed certificate");
    Issued { cert, key }
}

/// Self-signed root CA.
pub fn root_ca(cn: &str) -> Issued {
    let key = KeyPair::generate().expect("key generation");
    let cert = params(cn, &[], true)
        .self_signed(&key)
        .expect("root certificate");
    Issued { cert, key }
}

/// CA certificate signed by `issuer`.
pub fn intermediate_ca(cn: &str, issuer: &Issued) -> Issued {
    let key = KeyPair::generate().expect("key generation");
    let cert = params(cn, &[], true)
        .signed_by(&key, &issuer.cert, &issuer.key)
        .expect("intermediate certificate");
    Issued { cert, key }
}

/// End-entity certificate signed by `issuer`.
pub fn leaf(cn: &str, sans: &[&str], issuer: &Issued) -> Issued {
    let key = KeyPair::generate().expect("key generation");
    let cert = params(cn, sans, false)
        .signed_by(&key, &issuer.cert, &issuer.key)
        .expect("leaf certificate");
    Issued { cert, key }
}

fn pkcs8(key: &KeyPair) -> PrivateKeyDer<'static> {
    PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key.serialize_der()))
}

fn server_config_builder() -> rustls::ConfigBuilder<ServerConfig, rustls::WantsVerifier> {
    ServerConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
        .with_protocol_versions(rustls::ALL_VERSIONS)
        .expect("protocol versions")
}

/// Accepts TLS connections with `config` until the test runtime shuts down.
///
/// Handshake results are ignored: the inspector drops the connection as soon
/// as it has the certificates.
async fn listen(config: ServerConfig) -> SocketAddr {
    let acceptor = TlsAcceptor::from(Arc::new(config));
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");

    tokio::spawn(async move {
        while let Ok((sock, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                let _ = acceptor.accept(sock).await;
            });
        }
    });

    addr
}

/// Serves `chain` (leaf first) signed for with `key`.
pub async fn serve(chain: Vec<CertificateDer<'static>>, key: &KeyPair) -> SocketAddr {
    let config = server_config_builder()
        .with_no_client_auth()
        .with_single_cert(chain, pkcs8(key))
        .expect("server certificate");
    listen(config).await
}

/// Always answers with an empty certificate list.
#[derive(Debug)]
struct EmptyCertificateList(Arc<CertifiedKey>);

impl ResolvesServerCert for EmptyCertificateList {
    fn resolve(&self, _client_hello: ClientHello<'_>) -> Option<Arc<CertifiedKey>> {
        Some(Arc::clone(&self.0))
    }
}

/// Completes the server side of the handshake with an empty Certificate message.
pub async fn serve_without_certificate() -> SocketAddr {
    let key = KeyPair::generate().expect("key generation");
    let signer =
        rustls::crypto::ring::sign::any_supported_type(&pkcs8(&key)).expect("signing key");
    let resolver = EmptyCertificateList(Arc::new(CertifiedKey::new(Vec::new(), signer)));
    let config = server_config_builder()
        .with_no_client_auth()
        .with_cert_resolver(Arc::new(resolver));
    listen(config).await
}

/// Accepts TCP connections and never speaks TLS.
pub async fn serve_silent() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((sock, _)) = listener.accept().await {
            held.push(sock);
        }
    });

    addr
}
