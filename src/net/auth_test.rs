use super::*;

// =============================================================================
// parse_exchange_response — success
// =============================================================================

#[test]
fn parse_success_returns_grant() {
    let body = r#"{"token":"h.p.s","data":{"user":{"id":"u-1","email":"a@example.test","role":"admin"}}}"#;
    let grant = parse_exchange_response(200, body).unwrap();
    assert_eq!(grant.token, "h.p.s");
    assert_eq!(grant.user.email, "a@example.test");
}

#[test]
fn parse_created_is_success() {
    let body = r#"{"token":"t.t.t","data":{"user":{"id":3,"email":"b@example.test","role":"viewer"}}}"#;
    let grant = parse_exchange_response(201, body).unwrap();
    assert_eq!(grant.user.id, "3");
}

#[test]
fn parse_success_without_token_is_contract_error() {
    let body = r#"{"data":{"user":{"id":"u-1","email":"a@example.test","role":"admin"}}}"#;
    assert!(matches!(parse_exchange_response(200, body), Err(AuthServiceError::Contract(_))));
}

#[test]
fn parse_success_with_non_json_is_contract_error() {
    assert!(matches!(parse_exchange_response(200, "<html>"), Err(AuthServiceError::Contract(_))));
}

// =============================================================================
// parse_exchange_response — rejection
// =============================================================================

#[test]
fn parse_rejection_uses_message_field() {
    let err = parse_exchange_response(401, r#"{"status":"fail","message":"Incorrect email or password"}"#).unwrap_err();
    match err {
        AuthServiceError::Rejected { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Incorrect email or password");
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[test]
fn parse_rejection_falls_back_to_error_field() {
    let err = parse_exchange_response(400, r#"{"error":"email taken"}"#).unwrap_err();
    assert!(matches!(err, AuthServiceError::Rejected { status: 400, ref message } if message == "email taken"));
}

#[test]
fn parse_rejection_uses_plain_text_body() {
    let err = parse_exchange_response(403, "  Forbidden \n").unwrap_err();
    assert!(matches!(err, AuthServiceError::Rejected { status: 403, ref message } if message == "Forbidden"));
}

#[test]
fn parse_rejection_empty_body_reports_status() {
    let err = parse_exchange_response(401, "").unwrap_err();
    assert!(matches!(err, AuthServiceError::Rejected { status: 401, ref message } if message == "HTTP 401"));
}

#[test]
fn parse_rejection_unrecognized_json_reports_status() {
    let err = parse_exchange_response(500, r#"{"detail":"boom"}"#).unwrap_err();
    assert!(matches!(err, AuthServiceError::Rejected { status: 500, ref message } if message == "HTTP 500"));
}

// =============================================================================
// retryable
// =============================================================================

#[test]
fn retryable_network_and_server_errors() {
    assert!(AuthServiceError::Network("timeout".into()).retryable());
    assert!(AuthServiceError::Rejected { status: 503, message: String::new() }.retryable());
    assert!(AuthServiceError::Rejected { status: 429, message: String::new() }.retryable());
}

#[test]
fn not_retryable_rejections_and_contract() {
    assert!(!AuthServiceError::Rejected { status: 401, message: String::new() }.retryable());
    assert!(!AuthServiceError::Contract("x".into()).retryable());
}

// =============================================================================
// HttpAuthService
// =============================================================================

#[test]
fn endpoint_joins_base_url() {
    let svc = HttpAuthService::new(reqwest::Client::new(), "http://auth.test/");
    assert_eq!(svc.endpoint(LOGIN_PATH), "http://auth.test/api/auth/login");
    assert_eq!(svc.endpoint(SIGNUP_PATH), "http://auth.test/api/auth/signup");
}

#[tokio::test]
async fn unreachable_service_is_network_error() {
    // Port 9 (discard) on loopback is not expected to accept HTTP.
    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(2))
        .build()
        .unwrap();
    let svc = HttpAuthService::new(http, "http://127.0.0.1:9");
    let err = svc.login("a@example.test", "pw").await.unwrap_err();
    assert!(matches!(err, AuthServiceError::Network(_)));
}
