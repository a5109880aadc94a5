//! Tests for error construction and message fallbacks.

use super::*;
use rstest::rstest;

#[rstest]
fn invalid_request_constructor_sets_code() {
    let err = Error::invalid_request("bad");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), "bad");
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = Error::try_new(ErrorCode::InvalidRequest, "   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
#[case(ErrorCode::Network)]
#[case(ErrorCode::SessionExpired)]
#[case(ErrorCode::Cooldown)]
fn new_falls_back_to_default_message(#[case] code: ErrorCode) {
    let err = Error::new(code, "");
    assert_eq!(err.message(), code.default_message());
    assert!(!err.message().trim().is_empty());
}

#[rstest]
fn only_session_expiry_requires_login() {
    assert!(Error::session_expired("gone").requires_login());
    assert!(!Error::network("down").requires_login());
    assert!(!Error::unauthorized("nope").requires_login());
}

#[rstest]
fn display_uses_message() {
    let err = Error::network("Server unreachable");
    assert_eq!(err.to_string(), "Server unreachable");
}
