mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
        }
    }
}

/// External text-generation service.
///
/// Every method returns the raw reply text, which may be empty. Transport
/// and service failures surface as errors; callers decide how to degrade.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Single prompt whose reply must be JSON conforming to `schema`
    async fn generate_json(&self, prompt: &str, schema: &serde_json::Value) -> Result<String>;

    /// Multi-turn conversation under a fixed system instruction
    async fn chat(&self, system: &str, history: &[ChatTurn], message: &str) -> Result<String>;

    /// Short free-text completion
    async fn complete(&self, prompt: &str, max_output_tokens: u32, temperature: f32)
        -> Result<String>;
}
