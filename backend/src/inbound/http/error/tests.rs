//! Tests for HTTP error mapping.

use super::*;
use actix_web::body::to_bytes;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn closed_study() -> Error {
    Error::conflict("study L-001 is closed")
        .with_trace_id(TRACE_ID)
        .with_details(json!({"lote": "L-001", "code": "closed"}))
}

async fn read_error(error: &Error) -> (StatusCode, Option<String>, Error) {
    let response = ResponseError::error_response(error);
    let status = response.status();
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .map(|value| value.to_str().expect("ascii header").to_owned());
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    let payload = serde_json::from_slice(&bytes).expect("Error JSON deserialisation succeeds");
    (status, header, payload)
}

#[rstest]
#[case(ErrorCode::InvalidRequest, StatusCode::BAD_REQUEST)]
#[case(ErrorCode::NotFound, StatusCode::NOT_FOUND)]
#[case(ErrorCode::Conflict, StatusCode::CONFLICT)]
#[case(ErrorCode::InternalError, StatusCode::INTERNAL_SERVER_ERROR)]
fn status_matches_error_code(#[case] code: ErrorCode, #[case] expected: StatusCode) {
    assert_eq!(status_for(code), expected);
    assert_eq!(ResponseError::status_code(&Error::new(code, "x")), expected);
}

#[rstest]
#[actix_web::test]
async fn conflict_keeps_details_and_trace_header(closed_study: Error) {
    let (status, header, payload) = read_error(&closed_study).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(header.as_deref(), Some(TRACE_ID));
    assert_eq!(payload, closed_study);
}

#[rstest]
#[actix_web::test]
async fn storage_errors_keep_their_cause() {
    let error = Error::internal("study storage error").with_cause("disk I/O error");

    let (status, header, payload) = read_error(&error).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(header.is_none());
    assert_eq!(payload.cause(), Some("disk I/O error"));
}

#[rstest]
fn actix_errors_are_redacted() {
    let err: Error = actix_web::error::ErrorBadRequest("boom").into();

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), "Internal server error");
    assert_eq!(err.cause(), None);
    assert_eq!(err.details(), None);
}
