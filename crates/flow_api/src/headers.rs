use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::config::FlowSettings;
use crate::error::FlowApiError;

pub const HEADER_ACCEPT: &str = "accept";
pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const HEADER_AUTHORIZATION: &str = "authorization";
pub const HEADER_API_KEY: &str = "x-api-key";
pub const HEADER_USER_AGENT: &str = "user-agent";

/// Accept header for streaming runs: event streams first, JSON as fallback.
pub const ACCEPT_STREAM: &str = "text/event-stream, application/json;q=0.9, */*;q=0.8";
pub const ACCEPT_JSON: &str = "application/json";
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Which endpoint family a header set is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// `POST /run/{flow}?stream=true`.
    StreamingRun,
    /// `POST /run/{flow}`.
    Run,
    /// `GET /monitor/messages`.
    History,
    /// `DELETE /monitor/messages/session/{id}`.
    Delete,
}

/// Build a deterministic header map for a request of the given kind.
pub fn build_headers(settings: &FlowSettings, kind: RequestKind) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();

    match kind {
        RequestKind::StreamingRun => {
            headers.insert(HEADER_ACCEPT.to_owned(), ACCEPT_STREAM.to_owned());
            headers.insert(HEADER_CONTENT_TYPE.to_owned(), CONTENT_TYPE_JSON.to_owned());
        }
        RequestKind::Run => {
            headers.insert(HEADER_ACCEPT.to_owned(), ACCEPT_JSON.to_owned());
            headers.insert(HEADER_CONTENT_TYPE.to_owned(), CONTENT_TYPE_JSON.to_owned());
        }
        RequestKind::History => {
            headers.insert(HEADER_ACCEPT.to_owned(), ACCEPT_JSON.to_owned());
        }
        RequestKind::Delete => {}
    }

    if let Some(api_key) = settings.api_key() {
        headers.insert(HEADER_API_KEY.to_owned(), api_key.to_owned());
        headers.insert(HEADER_AUTHORIZATION.to_owned(), format!("Bearer {api_key}"));
    }

    if let Some(user_agent) = settings
        .user_agent
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        headers.insert(HEADER_USER_AGENT.to_owned(), user_agent.to_owned());
    }

    headers
}

/// Convert [`build_headers`] output into a `reqwest` header map.
pub fn to_header_map(headers: BTreeMap<String, String>) -> Result<HeaderMap, FlowApiError> {
    let mut out = HeaderMap::new();
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|_| FlowApiError::InvalidHeader(format!("name: {key}")))?;
        let value = HeaderValue::from_str(&value)
            .map_err(|_| FlowApiError::InvalidHeader(format!("value for {key}")))?;
        out.insert(name, value);
    }
    Ok(out)
}
