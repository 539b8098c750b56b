//! Certificate decoding.
//!
//! Turns one DER certificate into a [`ParsedCertificate`]: names, validity,
//! serial, fingerprint, SANs, signature algorithm and public key metadata.

use std::net::{Ipv4Addr, Ipv6Addr};

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use x509_parser::certificate::X509Certificate;
use x509_parser::extensions::{GeneralName, ParsedExtension};
use x509_parser::objects::{oid2sn, oid_registry};
use x509_parser::public_key::PublicKey;
use x509_parser::time::ASN1Time;
use x509_parser::x509::SubjectPublicKeyInfo;

use crate::models::{ParsedCertificate, PublicKeySize};
use crate::tls::chain::{digest_sha256, format_fingerprint};

/// Decodes a DER certificate.
///
/// Extracts subject and issuer (RFC 4514), the validity window in UTC, the
/// serial as uppercase hex, the SHA-256 fingerprint, SANs as `<type>:<value>`,
/// the signature algorithm short name and the public key family with its size
/// or curve where one applies.
///
/// # Arguments
///
/// * `der` - Exactly one DER-encoded X.509 certificate
///
/// # Returns
///
/// The decoded [`ParsedCertificate`]. `public_key_size` is `None` for key
/// families without a modulus or named curve (Ed25519, Ed448, DSA, unknown).
///
/// # Errors
///
/// Returns an error if the bytes are not exactly one well-formed X.509
/// certificate, or if its validity window ends before it starts.
pub fn parse_certificate(der: &[u8]) -> Result<ParsedCertificate> {
    let (rest, cert) = x509_parser::parse_x509_certificate(der)
        .map_err(|e| anyhow!("malformed certificate: {e}"))?;
    if !rest.is_empty() {
        bail!("{} trailing bytes after the certificate", rest.len());
    }

    let valid_from = asn1_time_to_utc(cert.validity().not_before).context("invalid notBefore")?;
    let valid_to = asn1_time_to_utc(cert.validity().not_after).context("invalid notAfter")?;
    if valid_from > valid_to {
        bail!("validity window ends ({valid_to}) before it starts ({valid_from})");
    }

    let (public_key_type, public_key_size) = public_key_details(cert.public_key());

    Ok(ParsedCertificate {
        subject: cert.subject().to_string(),
        issuer: cert.issuer().to_string(),
        valid_from,
        valid_to,
        serial_number: format_serial(cert.tbs_certificate.raw_serial()),
        fingerprint_sha256: format_fingerprint(&digest_sha256(der)),
        san: extract_certificate_sans(&cert),
        signature_algorithm: signature_algorithm_name(&cert),
        public_key_type,
        public_key_size,
    })
}

fn asn1_time_to_utc(time: ASN1Time) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(time.timestamp(), 0)
        .ok_or_else(|| anyhow!("timestamp {} is out of range", time.timestamp()))
}

/// Uppercase hex without the DER sign-padding zeros.
fn format_serial(raw: &[u8]) -> String {
    let start = raw.iter().position(|b| *b != 0).unwrap_or(raw.len());
    let significant = &raw[start..];
    if significant.is_empty() {
        return "00".to_string();
    }
    significant.iter().map(|b| format!("{b:02X}")).collect()
}

fn signature_algorithm_name(cert: &X509Certificate<'_>) -> String {
    let oid = &cert.signature_algorithm.algorithm;
    oid2sn(oid, oid_registry())
        .map(str::to_string)
        .unwrap_or_else(|_| oid.to_string())
}

/// Key family name and size for a subject public key.
fn public_key_details(spki: &SubjectPublicKeyInfo<'_>) -> (String, Option<PublicKeySize>) {
    let oid_str = spki.algorithm.algorithm.to_string();
    match oid_str.as_str() {
        "1.2.840.113549.1.1.1" => ("rsa".to_string(), rsa_key_size(spki)),
        "1.2.840.113549.1.1.10" => ("rsa-pss".to_string(), rsa_key_size(spki)),
        "1.2.840.10045.2.1" => ("ec".to_string(), ec_curve(spki)),
        "1.3.101.112" => ("ed25519".to_string(), None),
        "1.3.101.113" => ("ed448".to_string(), None),
        "1.2.840.10040.4.1" => ("dsa".to_string(), None),
        _ => (oid_str, None),
    }
}

fn rsa_key_size(spki: &SubjectPublicKeyInfo<'_>) -> Option<PublicKeySize> {
    match spki.parsed() {
        Ok(PublicKey::RSA(rsa)) => Some(PublicKeySize::Size(modulus_bits(rsa.modulus))),
        Ok(_) => None,
        Err(e) => {
            log::debug!("RSA public key could not be decoded: {e}");
            None
        }
    }
}

/// Bit length of a big-endian unsigned integer.
fn modulus_bits(modulus: &[u8]) -> u32 {
    let start = modulus.iter().position(|b| *b != 0).unwrap_or(modulus.len());
    match modulus[start..].first() {
        Some(first) => (modulus.len() - start - 1) as u32 * 8 + (8 - first.leading_zeros()),
        None => 0,
    }
}

fn ec_curve(spki: &SubjectPublicKeyInfo<'_>) -> Option<PublicKeySize> {
    let curve_oid = spki.algorithm.parameters.as_ref()?.as_oid().ok()?.to_string();
    let name = match curve_oid.as_str() {
        "1.2.840.10045.3.1.7" => "prime256v1".to_string(),
        "1.3.132.0.34" => "secp384r1".to_string(),
        "1.3.132.0.35" => "secp521r1".to_string(),
        "1.3.132.0.10" => "secp256k1".to_string(),
        _ => curve_oid,
    };
    Some(PublicKeySize::Curve(name))
}

/// Extracts Subject Alternative Names as `<type>:<value>` entries.
///
/// Entries keep certificate order. Values are trimmed and entries left without
/// a value are dropped.
pub(crate) fn extract_certificate_sans(cert: &X509Certificate<'_>) -> Vec<String> {
    let mut sans = Vec::new();

    for ext in cert.extensions() {
        if let ParsedExtension::SubjectAlternativeName(san) = ext.parsed_extension() {
            sans.extend(san.general_names.iter().filter_map(format_general_name));
        }
    }

    sans
}

fn format_general_name(name: &GeneralName<'_>) -> Option<String> {
    let (label, value) = match name {
        GeneralName::DNSName(dns) => ("DNS", dns.to_string()),
        GeneralName::IPAddress(bytes) => ("IP Address", format_ip(bytes)?),
        GeneralName::RFC822Name(email) => ("email", email.to_string()),
        GeneralName::URI(uri) => ("URI", uri.to_string()),
        GeneralName::DirectoryName(dn) => ("DirName", dn.to_string()),
        GeneralName::RegisteredID(oid) => ("Registered ID", oid.to_string()),
        GeneralName::OtherName(oid, _) => ("othername", oid.to_string()),
        _ => return None,
    };
    let value = value.trim();
    (!value.is_empty()).then(|| format!("{label}:{value}"))
}

fn format_ip(bytes: &[u8]) -> Option<String> {
    if let Ok(v4) = <[u8; 4]>::try_from(bytes) {
        return Some(Ipv4Addr::from(v4).to_string());
    }
    if let Ok(v6) = <[u8; 16]>::try_from(bytes) {
        return Some(Ipv6Addr::from(v6).to_string());
    }
    log::debug!("Ignoring SAN IP address of {} bytes", bytes.len());
    None
}
