use super::*;
use serde_json::json;

#[test]
fn login_request_serializes_two_fields() {
    let body = serde_json::to_value(LoginRequest { email: "a@example.test", password: "pw" }).unwrap();
    assert_eq!(body, json!({ "email": "a@example.test", "password": "pw" }));
}

#[test]
fn signup_request_serializes_role() {
    let body =
        serde_json::to_value(SignupRequest { email: "a@example.test", password: "pw", role: "editor" }).unwrap();
    assert_eq!(body, json!({ "email": "a@example.test", "password": "pw", "role": "editor" }));
}

#[test]
fn auth_response_converts_to_grant() {
    let resp: AuthResponse = serde_json::from_value(json!({
        "status": "success",
        "token": "h.p.s",
        "data": { "user": { "id": "u-1", "email": "a@example.test", "role": "admin", "createdAt": "x" } }
    }))
    .unwrap();
    let grant = AuthGrant::from(resp);
    assert_eq!(grant.token, "h.p.s");
    assert_eq!(grant.user.id, "u-1");
    assert_eq!(grant.user.role, "admin");
}

#[test]
fn auth_response_requires_user() {
    let parsed = serde_json::from_value::<AuthResponse>(json!({ "token": "h.p.s", "data": {} }));
    assert!(parsed.is_err());
}

#[test]
fn error_body_fields_are_optional() {
    let body: ErrorBody = serde_json::from_value(json!({})).unwrap();
    assert!(body.message.is_none());
    assert!(body.error.is_none());
}
