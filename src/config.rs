//! Environment overrides layered over the stored settings.

use std::env;

use flow_api::FlowSettings;
use settings_store::StoredSettings;

pub const BASE_URL_ENV: &str = "FLOW_CHAT_BASE_URL";
pub const API_KEY_ENV: &str = "FLOW_CHAT_API_KEY";
pub const FLOW_ID_ENV: &str = "FLOW_CHAT_FLOW_ID";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub flow_id: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            base_url: env_string_opt(BASE_URL_ENV),
            api_key: env_string_opt(API_KEY_ENV),
            flow_id: env_string_opt(FLOW_ID_ENV),
        }
    }

    /// Stored settings with any override applied on top.
    #[must_use]
    pub fn resolve(&self, stored: &StoredSettings) -> FlowSettings {
        let mut settings = stored.to_flow_settings();
        if let Some(base_url) = &self.base_url {
            settings = settings.with_base_url(base_url.clone());
        }
        if let Some(api_key) = &self.api_key {
            settings = settings.with_api_key(api_key.clone());
        }
        if let Some(flow_id) = &self.flow_id {
            settings = settings.with_flow_id(flow_id.clone());
        }
        settings.with_user_agent(concat!("flow_chat/", env!("CARGO_PKG_VERSION")))
    }
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}
