use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Request body of the flow run endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    pub input_value: String,
    pub output_type: String,
    pub input_type: String,
    #[serde(default)]
    pub tweaks: Map<String, Value>,
    /// Present only on streaming runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl RunRequest {
    pub fn chat(message: impl Into<String>, session_id: Option<&str>) -> Self {
        Self {
            input_value: message.into(),
            output_type: "chat".to_owned(),
            input_type: "chat".to_owned(),
            tweaks: Map::new(),
            stream: None,
            session_id: session_id
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(ToOwned::to_owned),
        }
    }

    pub fn streaming(mut self) -> Self {
        self.stream = Some(true);
        self
    }
}
