//! Batch runner used by the CLI.

mod helpers;

use chain_inspector::app::{parse_target, read_requests, render, Outcome};
use chain_inspector::{run_inspections, ErrorKind, Inspector, InspectorConfig};
use time::{Duration, OffsetDateTime};

use helpers::{self_signed, serve};

#[tokio::test]
async fn test_outcomes_keep_input_order() {
    let now = OffsetDateTime::now_utc();
    let first = self_signed("first.test", &["first.test"], now, now + Duration::days(10));
    let second = self_signed("second.test", &["second.test"], now, now + Duration::days(20));
    let first_addr = serve(vec![first.der()], &first.key).await;
    let second_addr = serve(vec![second.der()], &second.key).await;

    let requests = vec![
        parse_target(&format!("127.0.0.1:{}", second_addr.port()), 443, None),
        parse_target("bad target:443", 443, None),
        parse_target(&format!("127.0.0.1:{}", first_addr.port()), 443, None),
    ];

    let inspector = Inspector::new(InspectorConfig::default()).unwrap();
    let outcomes = run_inspections(&inspector, requests, 2).await;
    assert_eq!(outcomes.len(), 3);

    match &outcomes[0] {
        Outcome::Success(result) => assert_eq!(result.chain[0].subject, "CN=second.test"),
        other => panic!("expected success, got {other:?}"),
    }
    match &outcomes[1] {
        Outcome::Failure { host, error, .. } => {
            assert_eq!(host.as_deref(), Some("bad target"));
            assert_eq!(error.kind, ErrorKind::InvalidInput);
        }
        other => panic!("expected failure, got {other:?}"),
    }
    match &outcomes[2] {
        Outcome::Success(result) => assert_eq!(result.chain[0].subject, "CN=first.test"),
        other => panic!("expected success, got {other:?}"),
    }
}

#[tokio::test]
async fn test_stdin_payloads_flow_through() {
    let now = OffsetDateTime::now_utc();
    let cert = self_signed("stdin.test", &["stdin.test"], now, now + Duration::days(10));
    let addr = serve(vec![cert.der()], &cert.key).await;

    let input = format!(
        "{{\"host\":\"127.0.0.1\",\"port\":{},\"sni\":\"stdin.test\"}}\n{{\"port\":1}}\n",
        addr.port()
    );
    let requests = read_requests(input.as_bytes()).await.unwrap();
    let inspector = Inspector::new(InspectorConfig::default()).unwrap();
    let outcomes = run_inspections(&inspector, requests, 4).await;

    assert!(!outcomes[0].is_failure());
    assert!(outcomes[1].is_failure());

    let rendered: serde_json::Value = serde_json::from_str(&render(&outcomes[0], false)).unwrap();
    assert_eq!(rendered["sni"], "stdin.test");
    assert_eq!(rendered["chain"][0]["subject"], "CN=stdin.test");
}
