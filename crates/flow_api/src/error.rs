use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::sniff::looks_like_html;

/// Fixed text shown whenever the server answers with an HTML page or cannot
/// be reached at all.
pub const CONNECTION_FAILED_MESSAGE: &str = "Unable to connect to the server.";

#[derive(Debug, Error)]
pub enum FlowApiError {
    #[error("configuration incomplete: {0}")]
    Config(&'static str),

    #[error("message must not be empty")]
    EmptyMessage,

    #[error("Unable to connect to the server.")]
    Connection,

    #[error("API error ({status}): {body}")]
    Api { status: StatusCode, body: String },

    #[error("unexpected response from server: {0}")]
    UnexpectedResponse(String),

    #[error("no data received within {seconds}s of sending the request")]
    StreamTimeout { seconds: u64 },

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("malformed JSON response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid header {0}")]
    InvalidHeader(String),
}

impl FlowApiError {
    /// Builds the error for a non-2xx response, hiding HTML error pages behind
    /// the fixed connection message.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        if looks_like_html(body) {
            return Self::Connection;
        }
        Self::Api {
            status,
            body: parse_error_message(status, body),
        }
    }

    /// Builds the error for a 2xx response that did not carry the expected
    /// content type.
    pub fn unexpected_body(body: &str) -> Self {
        if looks_like_html(body) {
            return Self::Connection;
        }
        let trimmed = body.trim();
        if trimmed.is_empty() {
            Self::UnexpectedResponse("empty response body".to_owned())
        } else {
            Self::UnexpectedResponse(trimmed.to_owned())
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Request(error) => error.status(),
            _ => None,
        }
    }

    /// Human-readable message suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(_) => {
                "Set the server URL and flow id in the settings before chatting.".to_owned()
            }
            Self::Connection => connection_help(),
            Self::Request(error) if error.is_connect() || error.is_timeout() => connection_help(),
            Self::Api { status, .. }
                if matches!(*status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) =>
            {
                "The API key was rejected. Check it in the settings.".to_owned()
            }
            Self::Api { status, .. } if *status == StatusCode::NOT_FOUND => {
                "The flow could not be found. Check the flow id in the settings.".to_owned()
            }
            Self::Api { status, .. } if status.is_server_error() => {
                "The server reported an error. Please try again later.".to_owned()
            }
            other => other.to_string(),
        }
    }
}

/// Reduce an error body to the server-provided message when it is JSON.
///
/// Recognised shapes: `{"detail": "..."}`, `{"detail": [{"msg": "..."}]}`,
/// `{"message": "..."}`, `{"error": "..."}` and `{"error": {"message": "..."}}`.
pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string();
    }

    let Ok(value) = serde_json::from_str::<Value>(trimmed) else {
        return trimmed.to_string();
    };

    message_from_error_value(&value).unwrap_or_else(|| trimmed.to_string())
}

fn message_from_error_value(value: &Value) -> Option<String> {
    let detail = value.get("detail");
    if let Some(message) = detail.and_then(Value::as_str).and_then(non_empty) {
        return Some(message.to_owned());
    }
    if let Some(message) = detail
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .and_then(|item| item.get("msg"))
        .and_then(Value::as_str)
        .and_then(non_empty)
    {
        return Some(message.to_owned());
    }
    if let Some(message) = value
        .get("message")
        .and_then(Value::as_str)
        .and_then(non_empty)
    {
        return Some(message.to_owned());
    }

    let error = value.get("error")?;
    error
        .as_str()
        .or_else(|| error.get("message").and_then(Value::as_str))
        .and_then(non_empty)
        .map(ToOwned::to_owned)
}

fn connection_help() -> String {
    format!(
        "{} Check the server address and your network connection.",
        CONNECTION_FAILED_MESSAGE
    )
}

fn non_empty(value: &str) -> Option<&str> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
