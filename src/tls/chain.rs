//! Presented chain arena and the issuer-following walk.
//!
//! The peer's certificates are held as a flat arena indexed from the leaf (0).
//! Issuer linkage is an index into the same arena, so walking the chain never
//! holds references between certificates.

use std::collections::HashSet;

use log::debug;
use rustls::pki_types::CertificateDer;
use sha2::{Digest, Sha256};

/// One certificate the peer presented, with a link to its issuer's node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerCertificateNode {
    /// DER encoding as received
    pub der: CertificateDer<'static>,
    /// Arena index of the issuing certificate, `None` when not presented
    pub issuer: Option<usize>,
}

/// Arena of presented certificates, leaf at index 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresentedChain {
    nodes: Vec<PeerCertificateNode>,
}

impl PresentedChain {
    /// Builds the arena from certificates in the order the peer sent them and
    /// links each one to the presented certificate that issued it.
    ///
    /// A certificate's issuer is the presented certificate whose raw subject
    /// name equals its raw issuer name, checking the next certificate first,
    /// then the others, then itself. A self-issued root therefore links to
    /// itself. Certificates whose names cannot be decoded link positionally
    /// so the decode error surfaces when the chain is parsed.
    pub fn from_presented(certs: Vec<CertificateDer<'static>>) -> Self {
        let links = link_issuers(&certs);
        let nodes = certs
            .into_iter()
            .zip(links)
            .map(|(der, issuer)| PeerCertificateNode { der, issuer })
            .collect();
        Self { nodes }
    }

    /// Builds the arena from nodes whose links are already set.
    pub fn from_nodes(nodes: Vec<PeerCertificateNode>) -> Self {
        Self { nodes }
    }

    /// The end-entity certificate, if any was presented.
    pub fn leaf(&self) -> Option<&PeerCertificateNode> {
        self.nodes.first()
    }

    /// All nodes in presentation order.
    pub fn nodes(&self) -> &[PeerCertificateNode] {
        &self.nodes
    }

    /// Number of presented certificates.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the peer presented nothing.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Raw DER encodings of a certificate's subject and issuer names.
struct RawNames {
    subject: Vec<u8>,
    issuer: Vec<u8>,
}

fn link_issuers(certs: &[CertificateDer<'_>]) -> Vec<Option<usize>> {
    let names: Vec<Option<RawNames>> = certs.iter().map(|der| raw_names(der)).collect();
    let count = certs.len();

    (0..count)
        .map(|i| {
            let Some(own) = &names[i] else {
                return (i + 1 < count).then_some(i + 1);
            };
            let issued_by = |j: &usize| {
                names[*j]
                    .as_ref()
                    .is_some_and(|candidate| candidate.subject == own.issuer)
            };
            std::iter::once(i + 1)
                .filter(|j| *j < count)
                .chain((0..count).filter(|j| *j != i))
                .chain(std::iter::once(i))
                .find(issued_by)
        })
        .collect()
}

// The parsed certificate is dropped here, so the names are copied out.
fn raw_names(der: &CertificateDer<'_>) -> Option<RawNames> {
    let (_, cert) = x509_parser::parse_x509_certificate(der.as_ref()).ok()?;
    Some(RawNames {
        subject: cert.subject().as_raw().to_vec(),
        issuer: cert.issuer().as_raw().to_vec(),
    })
}

/// SHA-256 over a certificate's DER encoding.
pub(crate) fn digest_sha256(der: &[u8]) -> [u8; 32] {
    Sha256::digest(der).into()
}

/// Renders a digest as uppercase colon-separated hex pairs (`AA:BB:...`).
pub fn format_fingerprint(digest: &[u8]) -> String {
    digest
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(":")
}

/// Follows issuer links from the leaf and returns the raw certificates in
/// leaf-first order.
///
/// # Arguments
///
/// * `chain` - Presented certificates with issuer links already resolved
///
/// # Returns
///
/// DER slices borrowed from `chain`, leaf first. Empty when nothing was
/// presented.
///
/// The walk stops at a node without an issuer link, at a link pointing outside
/// the arena, at an empty certificate, or at a certificate whose fingerprint was
/// already emitted. The output never contains two identical certificates.
pub fn walk(chain: &PresentedChain) -> Vec<&[u8]> {
    let mut seen: HashSet<[u8; 32]> = HashSet::new();
    let mut walked = Vec::new();
    let mut cursor = (!chain.is_empty()).then_some(0);

    while let Some(index) = cursor {
        let Some(node) = chain.nodes.get(index) else {
            debug!("Issuer link {index} points outside the presented chain");
            break;
        };
        if node.der.is_empty() {
            break;
        }
        if !seen.insert(digest_sha256(&node.der)) {
            debug!("Certificate {index} repeats an earlier fingerprint, chain ends here");
            break;
        }
        walked.push(node.der.as_ref());
        cursor = node.issuer;
    }

    walked
}
