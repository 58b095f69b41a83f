use std::time::Duration;

use crate::error::FlowApiError;

/// Default base URL of a locally running flow server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:7860";
/// How long a streaming request may stay silent before it is abandoned in
/// favour of the non-streaming endpoint.
pub const DEFAULT_FIRST_CHUNK_TIMEOUT: Duration = Duration::from_secs(20);

/// Connection settings for one flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowSettings {
    /// Server origin, e.g. `https://flows.example.com`.
    pub base_url: String,
    /// Static credential forwarded as `x-api-key` and bearer token.
    pub api_key: Option<String>,
    /// Identifier of the flow to run.
    pub flow_id: String,
    /// Watchdog window for the first streamed chunk.
    pub first_chunk_timeout: Duration,
    /// Optional `User-Agent` override.
    pub user_agent: Option<String>,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            flow_id: String::new(),
            first_chunk_timeout: DEFAULT_FIRST_CHUNK_TIMEOUT,
            user_agent: None,
        }
    }
}

impl FlowSettings {
    pub fn new(base_url: impl Into<String>, flow_id: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            flow_id: flow_id.into(),
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = non_blank(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_flow_id(mut self, flow_id: impl Into<String>) -> Self {
        self.flow_id = flow_id.into();
        self
    }

    pub fn with_first_chunk_timeout(mut self, timeout: Duration) -> Self {
        self.first_chunk_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Merge the fields present in `update` into these settings.
    pub fn apply(&mut self, update: SettingsUpdate) {
        if let Some(base_url) = update.base_url {
            self.base_url = base_url;
        }
        if let Some(api_key) = update.api_key {
            self.api_key = non_blank(api_key);
        }
        if let Some(flow_id) = update.flow_id {
            self.flow_id = flow_id;
        }
    }

    /// Base URL with surrounding whitespace and trailing slashes removed.
    pub fn trimmed_base_url(&self) -> &str {
        self.base_url.trim().trim_end_matches('/')
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// Both the base URL and the flow id are required before running a flow.
    pub fn require_flow(&self) -> Result<(), FlowApiError> {
        self.require_base_url()?;
        if self.flow_id.trim().is_empty() {
            return Err(FlowApiError::Config("flow id is not configured"));
        }
        Ok(())
    }

    pub fn require_base_url(&self) -> Result<(), FlowApiError> {
        if self.trimmed_base_url().is_empty() {
            return Err(FlowApiError::Config("base URL is not configured"));
        }
        Ok(())
    }
}

/// Partial settings change; `None` leaves a field untouched and an empty
/// `api_key` clears the stored credential.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub flow_id: Option<String>,
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}
