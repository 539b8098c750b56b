//! Target parsing for the CLI.
//!
//! Targets come either from positional arguments (`host` or `host:port`) or
//! from newline-delimited JSON request payloads on stdin.

use log::warn;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::error_handling::InspectError;
use crate::models::InspectRequest;

/// Parses a `host` or `host:port` argument into a request payload.
///
/// A target with more than one `:` is taken as a bare IPv6 address and gets
/// `default_port`.
///
/// # Arguments
///
/// * `raw` - `host` or `host:port` as given on the command line
/// * `default_port` - Port used when `raw` carries none
/// * `sni` - Server name override applied to the request
///
/// # Returns
///
/// An unvalidated [`InspectRequest`]; range and charset checks happen when it
/// is inspected.
///
/// # Errors
///
/// `InvalidInput` if the part after the colon is not a number.
pub fn parse_target(
    raw: &str,
    default_port: u16,
    sni: Option<&str>,
) -> Result<InspectRequest, InspectError> {
    let raw = raw.trim();
    let (host, port) = match raw.split_once(':') {
        Some((host, port)) if !port.contains(':') => {
            let port: i64 = port.parse().map_err(|_| {
                InspectError::invalid_input(format!("target '{raw}' has a non-numeric port"))
            })?;
            (host, port)
        }
        _ => (raw, i64::from(default_port)),
    };

    Ok(InspectRequest {
        host: host.to_string(),
        port: Some(port),
        sni: sni.map(str::to_string),
    })
}

/// Reads one JSON request per line. Blank lines are skipped; lines that are
/// not valid payloads become `InvalidInput` errors in place.
pub async fn read_requests<R>(reader: R) -> std::io::Result<Vec<Result<InspectRequest, InspectError>>>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut requests = Vec::new();
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let request = serde_json::from_str::<InspectRequest>(line).map_err(|e| {
            warn!("Skipping malformed request on line {line_no}: {e}");
            InspectError::invalid_input(format!("line {line_no} is not a valid request: {e}"))
        });
        requests.push(request);
    }

    Ok(requests)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::ErrorKind;

    #[test]
    fn test_parse_target_forms() {
        let plain = parse_target("example.com", 443, None).unwrap();
        assert_eq!(plain.host, "example.com");
        assert_eq!(plain.port, Some(443));
        assert_eq!(plain.sni, None);

        let with_port = parse_target("example.com:8443", 443, Some("www.example.com")).unwrap();
        assert_eq!(with_port.host, "example.com");
        assert_eq!(with_port.port, Some(8443));
        assert_eq!(with_port.sni.as_deref(), Some("www.example.com"));

        let v6 = parse_target("2001:db8::1", 993, None).unwrap();
        assert_eq!(v6.host, "2001:db8::1");
        assert_eq!(v6.port, Some(993));
    }

    #[test]
    fn test_parse_target_bad_port() {
        let err = parse_target("example.com:https", 443, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_out_of_range_port_fails_validation_later() {
        let request = parse_target("example.com:70000", 443, None).unwrap();
        assert!(request.validate().is_err());
    }

    #[tokio::test]
    async fn test_read_requests() {
        let input = b"{\"host\":\"a.test\"}\n\n{\"host\":\"b.test\",\"port\":8443,\"sni\":\"c.test\"}\nnot json\n";
        let requests = read_requests(&input[..]).await.unwrap();
        assert_eq!(requests.len(), 3);

        let first = requests[0].as_ref().unwrap();
        assert_eq!(first.host, "a.test");
        assert_eq!(first.port, None);

        let second = requests[1].as_ref().unwrap();
        assert_eq!(second.port, Some(8443));
        assert_eq!(second.sni.as_deref(), Some("c.test"));

        let third = requests[2].as_ref().unwrap_err();
        assert_eq!(third.kind(), ErrorKind::InvalidInput);
        assert!(third.to_string().contains("line 4"));
    }
}
