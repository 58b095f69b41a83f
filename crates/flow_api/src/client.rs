use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{FlowSettings, SettingsUpdate};
use crate::error::FlowApiError;
use crate::events::{FinalResult, StreamChunk};
use crate::headers::{build_headers, to_header_map, RequestKind};
use crate::ndjson::NdjsonStreamParser;
use crate::payload::RunRequest;
use crate::response::parse_response;
use crate::sniff::looks_like_html;
use crate::sse::SseStreamParser;
use crate::transport::{choose_reader, FirstChunkWatchdog, ReaderKind};
use crate::url::run_url;

/// Client for one configured flow and its monitor endpoint.
#[derive(Debug)]
pub struct FlowApiClient {
    http: Client,
    settings: FlowSettings,
}

/// Outcome of [`FlowApiClient::test_connection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionCheck {
    pub success: bool,
    pub message: String,
}

impl FlowApiClient {
    pub fn new(settings: FlowSettings) -> Result<Self, FlowApiError> {
        let http = Client::builder().build()?;
        Ok(Self { http, settings })
    }

    pub fn settings(&self) -> &FlowSettings {
        &self.settings
    }

    /// Merge `update` into this client's settings. Later calls see the new
    /// values; calls already in flight keep the ones they started with.
    pub fn update_settings(&mut self, update: SettingsUpdate) {
        self.settings.apply(update);
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    pub(crate) fn headers(
        &self,
        kind: RequestKind,
    ) -> Result<reqwest::header::HeaderMap, FlowApiError> {
        to_header_map(build_headers(&self.settings, kind))
    }

    /// Build the run request; `stream` selects the `?stream=true` variant.
    pub fn build_run_request(
        &self,
        message: &str,
        session_id: Option<&str>,
        stream: bool,
    ) -> Result<RequestBuilder, FlowApiError> {
        self.settings.require_flow()?;
        let url = run_url(&self.settings, stream)?;
        let (kind, payload) = if stream {
            (
                RequestKind::StreamingRun,
                RunRequest::chat(message, session_id).streaming(),
            )
        } else {
            (RequestKind::Run, RunRequest::chat(message, session_id))
        };

        Ok(self
            .http
            .post(url)
            .headers(self.headers(kind)?)
            .json(&payload))
    }

    /// Send `message` and deliver incremental chunks to `on_chunk`.
    ///
    /// The streaming endpoint is tried first. If it fails for any reason,
    /// including a silent first-chunk window, the non-streaming endpoint is
    /// called once and its answer is delivered as a single raw chunk. Exactly
    /// one [`FinalResult`] is returned; in streaming mode it is empty and the
    /// chunks carry the state.
    pub async fn send_message_stream<F>(
        &self,
        message: &str,
        session_id: Option<&str>,
        mut on_chunk: F,
    ) -> Result<FinalResult, FlowApiError>
    where
        F: FnMut(StreamChunk),
    {
        validate_message(message)?;
        self.settings.require_flow()?;

        match self.stream_run(message, session_id, &mut on_chunk).await {
            Ok(result) => Ok(result),
            Err(error) => {
                warn!(%error, "streaming run failed, retrying without streaming");
                let result = self.send_message(message, session_id).await?;
                if !result.text.is_empty() {
                    on_chunk(StreamChunk::Raw(result.text.clone()));
                }
                Ok(result)
            }
        }
    }

    /// Run the flow without streaming and parse the complete response.
    pub async fn send_message(
        &self,
        message: &str,
        session_id: Option<&str>,
    ) -> Result<FinalResult, FlowApiError> {
        validate_message(message)?;
        let request = self.build_run_request(message, session_id, false)?;
        debug!(flow_id = %self.settings.flow_id, "sending non-streaming run");

        let response = ensure_success(request.send().await?).await?;
        let content_type = content_type(&response);
        if !content_type.contains("application/json") {
            let body = response.text().await.unwrap_or_default();
            return Err(FlowApiError::unexpected_body(&body));
        }

        let document: Value = response.json().await?;
        Ok(parse_response(&document))
    }

    /// Check reachability and configuration by running the flow with `"ping"`.
    pub async fn test_connection(&self) -> ConnectionCheck {
        match self.send_message("ping", None).await {
            Ok(_) => ConnectionCheck {
                success: true,
                message: "Connected successfully.".to_owned(),
            },
            Err(error) => ConnectionCheck {
                success: false,
                message: format!("Connection failed: {}", error.user_message()),
            },
        }
    }

    async fn stream_run<F>(
        &self,
        message: &str,
        session_id: Option<&str>,
        on_chunk: &mut F,
    ) -> Result<FinalResult, FlowApiError>
    where
        F: FnMut(StreamChunk),
    {
        let mut watchdog = FirstChunkWatchdog::arm(self.settings.first_chunk_timeout);
        let request = self.build_run_request(message, session_id, true)?;
        debug!(flow_id = %self.settings.flow_id, "sending streaming run");

        let response = watchdog.guard(request.send()).await??;
        let response = watchdog.guard(ensure_success(response)).await??;

        let content_type = content_type(&response);
        let has_body = response.content_length() != Some(0);
        let reader = choose_reader(&content_type, has_body)?;
        debug!(%content_type, ?reader, "reading run response");

        match reader {
            ReaderKind::Sse => {
                let mut parser = SseStreamParser::default();
                let mut body = response.bytes_stream();
                loop {
                    let Some(bytes) = watchdog.guard(body.next()).await? else {
                        break;
                    };
                    for chunk in parser.feed(&bytes?) {
                        deliver(chunk, &mut watchdog, on_chunk)?;
                    }
                    if parser.is_done() {
                        break;
                    }
                }
                Ok(FinalResult::stream_end())
            }
            ReaderKind::Ndjson => {
                let mut parser = NdjsonStreamParser::default();
                let mut body = response.bytes_stream();
                loop {
                    let Some(bytes) = watchdog.guard(body.next()).await? else {
                        break;
                    };
                    for chunk in parser.feed(&bytes?)? {
                        deliver(chunk, &mut watchdog, on_chunk)?;
                    }
                    if parser.is_done() {
                        break;
                    }
                }
                for chunk in parser.finish()? {
                    deliver(chunk, &mut watchdog, on_chunk)?;
                }
                Ok(FinalResult::stream_end())
            }
            // Only chosen for a declared empty body, which fails to parse and
            // so always ends in the non-streaming run.
            ReaderKind::SingleJson => {
                let body = watchdog.guard(response.text()).await??;
                let document: Value = serde_json::from_str(&body)?;
                let result = parse_response(&document);
                if !result.text.is_empty() {
                    deliver(StreamChunk::Raw(result.text.clone()), &mut watchdog, on_chunk)?;
                }
                Ok(result)
            }
        }
    }
}

/// Pass a chunk to the caller unless it carries an HTML page; the first
/// delivered chunk disarms the watchdog.
fn deliver<F>(
    chunk: StreamChunk,
    watchdog: &mut FirstChunkWatchdog,
    on_chunk: &mut F,
) -> Result<(), FlowApiError>
where
    F: FnMut(StreamChunk),
{
    if chunk.text().is_some_and(looks_like_html) {
        return Err(FlowApiError::Connection);
    }
    watchdog.observe();
    on_chunk(chunk);
    Ok(())
}

fn validate_message(message: &str) -> Result<(), FlowApiError> {
    if message.trim().is_empty() {
        return Err(FlowApiError::EmptyMessage);
    }
    Ok(())
}

pub(crate) fn content_type(response: &Response) -> String {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase()
}

/// Turn a non-2xx response into the matching error, reading its body.
pub(crate) async fn ensure_success(response: Response) -> Result<Response, FlowApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_else(|_| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });
    warn!(status = status.as_u16(), "flow server returned an error status");
    Err(FlowApiError::from_status(status, &body))
}
