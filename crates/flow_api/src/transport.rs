use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::FlowApiError;
use crate::sniff::is_html_content_type;

/// How a streaming response body is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderKind {
    /// `text/event-stream` framing.
    Sse,
    /// Line-delimited frames; the generic fallback for any other content type.
    Ndjson,
    /// One JSON document read in full.
    SingleJson,
}

/// Select the reader for a response from its `Content-Type` and whether it
/// has a body to stream. HTML responses are rejected outright.
pub fn choose_reader(content_type: &str, has_body: bool) -> Result<ReaderKind, FlowApiError> {
    let content_type = content_type.to_ascii_lowercase();
    if is_html_content_type(&content_type) {
        return Err(FlowApiError::Connection);
    }
    if content_type.contains("text/event-stream") {
        return Ok(ReaderKind::Sse);
    }
    if has_body {
        return Ok(ReaderKind::Ndjson);
    }
    Ok(ReaderKind::SingleJson)
}

/// Deadline for the first chunk of a streaming run.
///
/// Until [`FirstChunkWatchdog::observe`] is called, every guarded await fails
/// with [`FlowApiError::StreamTimeout`] once the window has elapsed.
#[derive(Debug)]
pub struct FirstChunkWatchdog {
    deadline: Instant,
    window: Duration,
    observed: bool,
}

impl FirstChunkWatchdog {
    pub fn arm(window: Duration) -> Self {
        Self {
            deadline: Instant::now() + window,
            window,
            observed: false,
        }
    }

    /// Disarm the watchdog; called on the first delivered chunk.
    pub fn observe(&mut self) {
        self.observed = true;
    }

    pub fn is_observed(&self) -> bool {
        self.observed
    }

    pub fn is_expired(&self) -> bool {
        !self.observed && Instant::now() >= self.deadline
    }

    /// Await `future`, bounded by the deadline while no chunk has been seen.
    pub async fn guard<F>(&self, future: F) -> Result<F::Output, FlowApiError>
    where
        F: Future,
    {
        if self.observed {
            return Ok(future.await);
        }
        tokio::time::timeout_at(self.deadline, future)
            .await
            .map_err(|_| FlowApiError::StreamTimeout {
                seconds: self.window.as_secs(),
            })
    }
}
