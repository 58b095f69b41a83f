use url::Url;

use crate::config::FlowSettings;
use crate::error::FlowApiError;

const API_PREFIX: [&str; 2] = ["api", "v1"];

/// `POST {base}/api/v1/run/{flow_id}`, with `?stream=true` when streaming.
pub fn run_url(settings: &FlowSettings, stream: bool) -> Result<Url, FlowApiError> {
    let mut url = api_url(settings, &["run", settings.flow_id.trim()])?;
    if stream {
        url.query_pairs_mut().append_pair("stream", "true");
    }
    Ok(url)
}

/// `GET {base}/api/v1/monitor/messages[?session_id=...]`.
pub fn messages_url(settings: &FlowSettings, session_id: Option<&str>) -> Result<Url, FlowApiError> {
    let mut url = api_url(settings, &["monitor", "messages"])?;
    if let Some(session_id) = session_id {
        url.query_pairs_mut().append_pair("session_id", session_id);
    }
    Ok(url)
}

/// `DELETE {base}/api/v1/monitor/messages/session/{session_id}`.
pub fn session_url(settings: &FlowSettings, session_id: &str) -> Result<Url, FlowApiError> {
    api_url(settings, &["monitor", "messages", "session", session_id])
}

/// Join path segments onto the configured base URL, percent-encoding each
/// segment and keeping any path prefix the base already has.
fn api_url(settings: &FlowSettings, segments: &[&str]) -> Result<Url, FlowApiError> {
    settings.require_base_url()?;
    let base = settings.trimmed_base_url();
    let mut url = Url::parse(base).map_err(|error| FlowApiError::InvalidUrl(format!("{base}: {error}")))?;

    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| FlowApiError::InvalidUrl(format!("{base}: cannot be a base")))?;
        path.pop_if_empty();
        path.extend(API_PREFIX);
        path.extend(segments);
    }

    Ok(url)
}
