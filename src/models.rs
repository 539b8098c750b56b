//! Request and result records.
//!
//! `InspectRequest` is the loosely typed inbound payload, `ChainRequest` its
//! validated form. `ParsedCertificate` and `InspectionResult` are the outbound
//! records; their serde field names are the wire format.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_PORT, MAX_HOST_LENGTH};
use crate::error_handling::InspectError;

/// DNS names and IP literals (IPv6 without brackets).
static HOST_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._:\-]+$").expect("host charset pattern is valid")
});

/// Inbound request payload as decoded from JSON.
///
/// Nothing here is trusted; call [`InspectRequest::validate`] before use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectRequest {
    /// Host name or IP address to connect to
    pub host: String,
    /// TCP port, 443 when absent
    #[serde(default)]
    pub port: Option<i64>,
    /// Server name indication override, the host when absent
    #[serde(default)]
    pub sni: Option<String>,
}

impl InspectRequest {
    /// Checks host, port and SNI structurally. Performs no network I/O.
    pub fn validate(&self) -> Result<ChainRequest, InspectError> {
        let port = match self.port {
            None => DEFAULT_PORT,
            Some(p) => u16::try_from(p)
                .ok()
                .filter(|p| *p != 0)
                .ok_or_else(|| {
                    InspectError::invalid_input(format!("port {p} is outside 1-65535"))
                })?,
        };
        ChainRequest::new(&self.host, port, self.sni.as_deref())
    }
}

/// A validated inspection request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainRequest {
    host: String,
    port: u16,
    sni: String,
}

impl ChainRequest {
    /// Builds a request, defaulting `sni` to `host` when absent or blank.
    pub fn new(host: &str, port: u16, sni: Option<&str>) -> Result<Self, InspectError> {
        let host = validate_name("host", host)?;
        if port == 0 {
            return Err(InspectError::invalid_input("port 0 is outside 1-65535"));
        }
        let sni = match sni.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => validate_name("sni", s)?,
            None => host.clone(),
        };
        Ok(Self { host, port, sni })
    }

    /// Host to resolve and connect to.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// TCP port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Name advertised in the TLS server name indication.
    pub fn sni(&self) -> &str {
        &self.sni
    }

    /// `host:port`, used in log lines and error messages.
    pub fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn validate_name(field: &str, value: &str) -> Result<String, InspectError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(InspectError::invalid_input(format!("{field} must not be empty")));
    }
    if value.len() > MAX_HOST_LENGTH {
        return Err(InspectError::invalid_input(format!(
            "{field} is {} characters long (maximum {MAX_HOST_LENGTH})",
            value.len()
        )));
    }
    if !HOST_CHARSET.is_match(value) {
        return Err(InspectError::invalid_input(format!(
            "{field} contains characters outside a DNS name or IP address"
        )));
    }
    Ok(value.to_string())
}

/// Size information of a certificate's public key.
///
/// RSA-family keys carry a modulus bit length, elliptic-curve keys a named
/// curve. Keys of other families have neither and are represented by `None`
/// at the use site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicKeySize {
    /// Modulus length in bits
    Size(u32),
    /// Named curve, e.g. `prime256v1`
    Curve(String),
}

/// One decoded certificate of the presented chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCertificate {
    /// Subject distinguished name
    pub subject: String,
    /// Issuer distinguished name
    pub issuer: String,
    /// Start of the validity window
    pub valid_from: DateTime<Utc>,
    /// End of the validity window
    pub valid_to: DateTime<Utc>,
    /// Serial number, uppercase hex
    pub serial_number: String,
    /// SHA-256 over the DER encoding, uppercase colon-separated hex
    pub fingerprint_sha256: String,
    /// Subject alternative names as `<type>:<value>`
    pub san: Vec<String>,
    /// Signature algorithm short name (dotted OID when unknown)
    pub signature_algorithm: String,
    /// Key family: `rsa`, `rsa-pss`, `ec`, `ed25519`, `ed448`, `dsa` or dotted OID
    pub public_key_type: String,
    /// Bit length or curve, `null` for other families
    pub public_key_size: Option<PublicKeySize>,
}

/// Outcome of a successful inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionResult {
    /// Host as requested
    pub host: String,
    /// Port as requested
    pub port: u16,
    /// SNI that was advertised
    pub sni: String,
    /// Whole days until the leaf expires, negative once expired
    pub days_remaining: i64,
    /// Leaf first, root (if presented) last
    pub chain: Vec<ParsedCertificate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::ErrorKind;

    #[test]
    fn test_request_defaults_port_and_sni() {
        let req: InspectRequest = serde_json::from_str(r#"{"host":"example.com"}"#).unwrap();
        let validated = req.validate().unwrap();
        assert_eq!(validated.host(), "example.com");
        assert_eq!(validated.port(), 443);
        assert_eq!(validated.sni(), "example.com");
        assert_eq!(validated.target(), "example.com:443");
    }

    #[test]
    fn test_request_sni_override() {
        let req: InspectRequest =
            serde_json::from_str(r#"{"host":"192.0.2.7","port":8443,"sni":"api.example.com"}"#)
                .unwrap();
        let validated = req.validate().unwrap();
        assert_eq!(validated.port(), 8443);
        assert_eq!(validated.sni(), "api.example.com");
    }

    #[test]
    fn test_blank_sni_falls_back_to_host() {
        let validated = ChainRequest::new("example.com", 443, Some("  ")).unwrap();
        assert_eq!(validated.sni(), "example.com");
    }

    #[test]
    fn test_port_out_of_range_rejected() {
        for port in [0, -1, 65_536, 1_000_000] {
            let req = InspectRequest {
                host: "example.com".into(),
                port: Some(port),
                sni: None,
            };
            let err = req.validate().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput, "port {port}");
        }
    }

    #[test]
    fn test_host_edge_lengths() {
        assert!(ChainRequest::new("", 443, None).is_err());
        assert!(ChainRequest::new("a", 443, None).is_ok());
        let longest = "a".repeat(MAX_HOST_LENGTH);
        assert!(ChainRequest::new(&longest, 443, None).is_ok());
        let too_long = "a".repeat(MAX_HOST_LENGTH + 1);
        assert!(ChainRequest::new(&too_long, 443, None).is_err());
    }

    #[test]
    fn test_host_charset() {
        assert!(ChainRequest::new("::1", 443, None).is_ok());
        assert!(ChainRequest::new("_dmarc.example.com", 443, None).is_ok());
        assert!(ChainRequest::new("exa mple.com", 443, None).is_err());
        assert!(ChainRequest::new("example.com/path", 443, None).is_err());
        assert!(ChainRequest::new("[::1]", 443, None).is_err());
        assert!(ChainRequest::new("example.com", 443, Some("bad sni")).is_err());
    }

    #[test]
    fn test_public_key_size_serializes_as_tagged_union() {
        assert_eq!(
            serde_json::to_value(PublicKeySize::Size(2048)).unwrap(),
            serde_json::json!({"size": 2048})
        );
        assert_eq!(
            serde_json::to_value(PublicKeySize::Curve("prime256v1".into())).unwrap(),
            serde_json::json!({"curve": "prime256v1"})
        );
    }
}
