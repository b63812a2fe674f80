use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One declarative detector entry: `{type = "...", ...params}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl DetectorConfig {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            params: Map::new(),
        }
    }

    pub fn with_param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }
}

/// One declarative sink entry: `{type = "stdout" | "webhook" | "jsonl", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinkConfig {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

impl SinkConfig {
    pub fn stdout() -> Self {
        Self {
            kind: "stdout".to_string(),
            url: None,
            template: None,
            path: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub http_enabled: bool,
    pub window_minutes: u64,
    pub interval_seconds: u64,
    pub request_timeout_seconds: u64,
}
