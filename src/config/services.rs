use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationBackend {
    #[default]
    Simulated,
    Deterministic,
    Remote,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ConfirmationSettings {
    #[serde(default)]
    pub backend: ConfirmationBackend,
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_confirmation_timeout")]
    pub timeout_secs: u64,
}

impl Default for ConfirmationSettings {
    fn default() -> Self {
        Self {
            backend: ConfirmationBackend::default(),
            delay_ms: default_delay_ms(),
            endpoint: None,
            timeout_secs: default_confirmation_timeout(),
        }
    }
}

/// Text-generation service used for statements, chat and categories
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AiSettings {
    #[serde(default = "default_ai_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_ai_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            endpoint: default_ai_endpoint(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_ai_timeout(),
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

fn default_delay_ms() -> u64 {
    2000
}

fn default_confirmation_timeout() -> u64 {
    10
}

fn default_ai_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_ai_timeout() -> u64 {
    60
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    500
}
