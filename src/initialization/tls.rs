//! TLS client configuration.
//!
//! This module builds the rustls client configuration shared by every
//! connection a [`Connector`](crate::Connector) opens.

use std::sync::Arc;

use log::debug;
use rustls::crypto::ring::default_provider;
use rustls::{ClientConfig, RootCertStore};

use crate::config::TrustMode;
use crate::error_handling::InitializationError;
use crate::tls::InspectOnlyVerifier;

/// Initializes the rustls client configuration for a trust mode.
///
/// Uses the `ring` crypto provider with every protocol version rustls
/// implements (TLS 1.2 and TLS 1.3). The configuration is immutable once built
/// and is shared across connections through the returned `Arc`.
///
/// # Arguments
///
/// * `trust_mode` - `InspectOnly` accepts any presented chain, `WebPki`
///   validates against the bundled Mozilla root set
///
/// # Returns
///
/// A client configuration ready to hand to `tokio_rustls::TlsConnector`.
///
/// # Errors
///
/// Returns `InitializationError::TlsConfigError` if the crypto provider cannot
/// support the requested protocol versions.
pub fn init_client_config(trust_mode: TrustMode) -> Result<Arc<ClientConfig>, InitializationError> {
    let provider = Arc::new(default_provider());
    let builder = ClientConfig::builder_with_provider(Arc::clone(&provider))
        .with_protocol_versions(rustls::ALL_VERSIONS)?;

    let config = match trust_mode {
        TrustMode::InspectOnly => builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(InspectOnlyVerifier::new(&provider)))
            .with_no_client_auth(),
        TrustMode::WebPki => {
            let mut root_store = RootCertStore::empty();
            root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
            debug!("Loaded {} trust anchors", root_store.len());
            builder
                .with_root_certificates(root_store)
                .with_no_client_auth()
        }
    };

    Ok(Arc::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_trust_modes_build_a_client_config() {
        for trust_mode in [TrustMode::InspectOnly, TrustMode::WebPki] {
            let config = init_client_config(trust_mode).unwrap();
            assert!(config.enable_sni);
            assert!(config.alpn_protocols.is_empty());
        }
    }
}
