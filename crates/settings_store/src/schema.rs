use flow_api::{FlowSettings, SettingsUpdate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_AI_NAME: &str = "Assistant";

/// Settings as persisted on disk. Missing fields take their defaults, so an
/// older or hand-edited file still loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredSettings {
    pub base_url: String,
    pub api_key: String,
    pub flow_id: String,
    /// Display name of the assistant in the transcript.
    pub ai_name: String,
}

impl Default for StoredSettings {
    fn default() -> Self {
        Self {
            base_url: flow_api::config::DEFAULT_BASE_URL.to_owned(),
            api_key: String::new(),
            flow_id: String::new(),
            ai_name: DEFAULT_AI_NAME.to_owned(),
        }
    }
}

impl StoredSettings {
    #[must_use]
    pub fn to_flow_settings(&self) -> FlowSettings {
        FlowSettings::new(self.base_url.clone(), self.flow_id.clone())
            .with_api_key(self.api_key.clone())
    }

    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(base_url) = &patch.base_url {
            self.base_url = base_url.trim().to_owned();
        }
        if let Some(api_key) = &patch.api_key {
            self.api_key = api_key.trim().to_owned();
        }
        if let Some(flow_id) = &patch.flow_id {
            self.flow_id = flow_id.trim().to_owned();
        }
        if let Some(ai_name) = &patch.ai_name {
            let ai_name = ai_name.trim();
            self.ai_name = if ai_name.is_empty() {
                DEFAULT_AI_NAME.to_owned()
            } else {
                ai_name.to_owned()
            };
        }
    }

    /// Display name, falling back to the default when blank.
    #[must_use]
    pub fn display_name(&self) -> &str {
        let name = self.ai_name.trim();
        if name.is_empty() {
            DEFAULT_AI_NAME
        } else {
            name
        }
    }
}

/// Fields to change; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub flow_id: Option<String>,
    pub ai_name: Option<String>,
}

impl SettingsPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.base_url.is_none()
            && self.api_key.is_none()
            && self.flow_id.is_none()
            && self.ai_name.is_none()
    }

    /// The connection part of the patch, for a live client.
    #[must_use]
    pub fn flow_update(&self) -> SettingsUpdate {
        SettingsUpdate {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            flow_id: self.flow_id.clone(),
        }
    }
}
