use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityConfig {
    /// Period of the batched commit tick.
    #[serde(default = "default_throttle_interval_ms")]
    pub throttle_interval_ms: u64,
    /// Commit completion/error transitions without waiting for the tick.
    #[serde(default = "default_true")]
    pub expedite_terminal: bool,
    #[serde(default = "default_key_argument_max_chars")]
    pub key_argument_max_chars: usize,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            throttle_interval_ms: default_throttle_interval_ms(),
            expedite_terminal: true,
            key_argument_max_chars: default_key_argument_max_chars(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub activity: ActivityConfig,
    #[serde(default)]
    pub store_path: Option<String>,
}

impl AppConfig {
    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_env() -> Result<Self, AppError> {
        let mut cfg = AppConfig::default();
        if let Ok(url) = std::env::var("RESEARCH_API_URL") {
            if !url.trim().is_empty() {
                cfg.api.base_url = url.trim().to_string();
            }
        }
        if let Ok(ms) = std::env::var("RESEARCH_THROTTLE_MS") {
            cfg.activity.throttle_interval_ms = ms
                .trim()
                .parse()
                .map_err(|_| AppError::Message(format!("Invalid RESEARCH_THROTTLE_MS '{ms}'")))?;
        }
        if let Ok(path) = std::env::var("STORE_SQLITE_PATH") {
            cfg.store_path = Some(path);
        }
        Ok(cfg)
    }
}

fn default_true() -> bool {
    true
}

fn default_throttle_interval_ms() -> u64 {
    150
}

fn default_key_argument_max_chars() -> usize {
    100
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let cfg = AppConfig::from_json("{}").unwrap();
        assert_eq!(cfg.api.base_url, "http://localhost:8000");
        assert_eq!(cfg.activity.throttle_interval_ms, 150);
        assert!(cfg.activity.expedite_terminal);
        assert_eq!(cfg.activity.key_argument_max_chars, 100);
        assert!(cfg.store_path.is_none());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let cfg = AppConfig::from_json(r#"{"activity": {"throttle_interval_ms": 200}}"#).unwrap();
        assert_eq!(cfg.activity.throttle_interval_ms, 200);
        assert!(cfg.activity.expedite_terminal);
        assert_eq!(cfg.api.timeout_secs, 30);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(AppConfig::from_json("{not json").is_err());
    }
}
