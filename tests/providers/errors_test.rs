//! Provider error classification and body sanitizing.

use pogovorim::providers::{sanitize_http_error_body, FailureKind, ProviderError};

#[test]
fn insufficient_balance_is_exhaustion_in_any_case() {
    let api = ProviderError::from_error_payload("INSUFFICIENT balance");
    assert_eq!(api.failure_kind(), FailureKind::Exhausted);

    let status = ProviderError::from_status(402, "{\"error\":\"Insufficient Balance\"}");
    assert_eq!(status.failure_kind(), FailureKind::Exhausted);
}

#[test]
fn long_bodies_are_classified_before_truncation() {
    let padding = "server said: ".repeat(40);
    let status = ProviderError::from_status(402, &format!("{padding}insufficient_quota"));
    assert_eq!(status.failure_kind(), FailureKind::Exhausted);

    let payload = ProviderError::from_error_payload(&format!("{padding}Insufficient Balance"));
    assert_eq!(payload.failure_kind(), FailureKind::Exhausted);
    assert!(payload.to_string().ends_with("...[truncated]"));
}

#[test]
fn status_without_exhaustion_keeps_the_code() {
    match ProviderError::from_status(503, "upstream\n  unavailable") {
        ProviderError::HttpStatus { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "upstream unavailable");
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
}

#[test]
fn everything_else_is_generic() {
    let cases = [
        ProviderError::Api {
            message: "model overloaded".to_owned(),
        },
        ProviderError::HttpStatus {
            status: 500,
            body: "boom".to_owned(),
        },
        ProviderError::Parse("insufficient data".to_owned()),
    ];
    for err in cases {
        assert_eq!(err.failure_kind(), FailureKind::Generic, "{err}");
    }
}

#[test]
fn sanitizer_redacts_keys_and_collapses_whitespace() {
    let raw = "bad   key\n sk-abcdefghijklmnop1234 and Bearer abcdefghijklmnopqrstu";
    let clean = sanitize_http_error_body(raw);
    assert_eq!(clean, "bad key [REDACTED] and [REDACTED]");
}

#[test]
fn sanitizer_truncates_long_bodies() {
    let raw = "x".repeat(1_000);
    let clean = sanitize_http_error_body(&raw);
    assert!(clean.ends_with("...[truncated]"));
    assert_eq!(clean.chars().filter(|c| *c == 'x').count(), 256);
}
