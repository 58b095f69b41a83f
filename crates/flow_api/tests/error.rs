use reqwest::StatusCode;

use flow_api::error::{parse_error_message, CONNECTION_FAILED_MESSAGE};
use flow_api::FlowApiError;

#[test]
fn parse_error_message_reads_detail_string() {
    let body = r#"{"detail":"Flow not found"}"#;
    assert_eq!(
        parse_error_message(StatusCode::NOT_FOUND, body),
        "Flow not found"
    );
}

#[test]
fn parse_error_message_reads_first_validation_detail() {
    let body = r#"{"detail":[{"loc":["body","input_value"],"msg":"field required"}]}"#;
    assert_eq!(
        parse_error_message(StatusCode::UNPROCESSABLE_ENTITY, body),
        "field required"
    );
}

#[test]
fn parse_error_message_reads_nested_error_message() {
    let body = r#"{"error":{"code":"bad_request","message":"invalid flow"}}"#;
    assert_eq!(
        parse_error_message(StatusCode::BAD_REQUEST, body),
        "invalid flow"
    );
}

#[test]
fn parse_error_message_falls_back_to_raw_body() {
    let body = "raw failure text";
    let message = parse_error_message(StatusCode::INTERNAL_SERVER_ERROR, body);
    assert_eq!(message, "raw failure text");
}

#[test]
fn parse_error_message_uses_reason_for_empty_body() {
    assert_eq!(
        parse_error_message(StatusCode::SERVICE_UNAVAILABLE, "  "),
        "Service Unavailable"
    );
}

#[test]
fn html_error_pages_never_reach_the_message() {
    let body = "<!DOCTYPE html><html><head><title>502 Bad Gateway</title></head></html>";
    let error = FlowApiError::from_status(StatusCode::BAD_GATEWAY, body);

    assert!(matches!(error, FlowApiError::Connection));
    assert_eq!(error.to_string(), CONNECTION_FAILED_MESSAGE);
    assert!(!error.user_message().contains("<html"));
}

#[test]
fn api_errors_keep_status_and_server_message() {
    let error = FlowApiError::from_status(StatusCode::BAD_REQUEST, r#"{"message":"bad tweak"}"#);

    assert_eq!(error.status(), Some(StatusCode::BAD_REQUEST));
    assert_eq!(error.to_string(), "API error (400 Bad Request): bad tweak");
}

#[test]
fn user_messages_map_common_statuses() {
    let unauthorized = FlowApiError::from_status(StatusCode::UNAUTHORIZED, "nope");
    assert!(unauthorized.user_message().contains("API key"));

    let missing = FlowApiError::from_status(StatusCode::NOT_FOUND, "");
    assert!(missing.user_message().contains("flow id"));

    let server = FlowApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom");
    assert!(server.user_message().contains("server reported an error"));

    let config = FlowApiError::Config("flow id is not set");
    assert!(config.user_message().contains("settings"));
}

#[test]
fn unexpected_body_hides_html_and_keeps_text() {
    assert!(matches!(
        FlowApiError::unexpected_body("<html><body>login</body></html>"),
        FlowApiError::Connection
    ));
    assert!(matches!(
        FlowApiError::unexpected_body(" plain "),
        FlowApiError::UnexpectedResponse(text) if text == "plain"
    ));
}
