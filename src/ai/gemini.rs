use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use ureq::Agent;

use super::{ChatRole, ChatTurn, TextGenerator};
use crate::config::AiSettings;
use crate::error::{LedgerError, Result};

/// Gemini `generateContent` over REST
pub struct GeminiClient {
    agent: Agent,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    api_key_env: String,
    max_attempts: u32,
    backoff: Duration,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<&'a serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

enum CallError {
    Retryable(String),
    Fatal(String),
}

impl<'a> Content<'a> {
    fn text(role: Option<&'a str>, text: &'a str) -> Self {
        Self {
            role,
            parts: vec![Part { text }],
        }
    }
}

impl GeminiClient {
    /// Build a client from the `[ai]` section. A missing API key is not an
    /// error here; every call fails with [`LedgerError::ServiceUnavailable`]
    /// instead.
    pub fn from_settings(settings: &AiSettings) -> Self {
        let api_key = std::env::var(&settings.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            tracing::warn!(
                env = %settings.api_key_env,
                "no API key set; AI features will be unavailable"
            );
        }

        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(settings.timeout_secs)))
            .build()
            .into();

        Self {
            agent,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key,
            api_key_env: settings.api_key_env.clone(),
            max_attempts: settings.max_attempts.max(1),
            backoff: Duration::from_millis(settings.backoff_ms),
        }
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    async fn send(&self, request: &GenerateRequest<'_>) -> Result<String> {
        let api_key = self.api_key.clone().ok_or_else(|| {
            LedgerError::ServiceUnavailable(format!("{} is not set", self.api_key_env))
        })?;
        let body = serde_json::to_string(request)
            .map_err(|e| LedgerError::ServiceUnavailable(e.to_string()))?;
        let url = self.url();

        let mut attempt = 1;
        loop {
            let agent = self.agent.clone();
            let (url, api_key, body) = (url.clone(), api_key.clone(), body.clone());
            tracing::debug!(model = %self.model, attempt, "calling text-generation service");

            let outcome = tokio::task::spawn_blocking(move || post(&agent, &url, &api_key, body))
                .await
                .map_err(|e| LedgerError::ServiceUnavailable(e.to_string()))?;

            match outcome {
                Ok(text) => return extract_text(&text),
                Err(CallError::Retryable(reason)) if attempt < self.max_attempts => {
                    let wait = self.backoff * 2u32.saturating_pow(attempt - 1);
                    tracing::warn!(attempt, %reason, ?wait, "service call failed, retrying");
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(CallError::Retryable(reason)) | Err(CallError::Fatal(reason)) => {
                    return Err(LedgerError::ServiceUnavailable(reason));
                }
            }
        }
    }
}

fn post(
    agent: &Agent,
    url: &str,
    api_key: &str,
    body: String,
) -> std::result::Result<String, CallError> {
    let mut response = agent
        .post(url)
        .header("content-type", "application/json")
        .header("x-goog-api-key", api_key)
        .send(body)
        .map_err(|e| match e {
            ureq::Error::StatusCode(code) if code != 429 && code < 500 => {
                CallError::Fatal(format!("service responded with status {code}"))
            }
            other => CallError::Retryable(other.to_string()),
        })?;

    response
        .body_mut()
        .read_to_string()
        .map_err(|e| CallError::Retryable(e.to_string()))
}

/// Concatenated text of the first candidate; empty when there is none
fn extract_text(raw: &str) -> Result<String> {
    let response: GenerateResponse = serde_json::from_str(raw)
        .map_err(|e| LedgerError::ServiceUnavailable(format!("malformed response: {e}")))?;

    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .unwrap_or_default();
    Ok(text)
}

fn role_name(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "user",
        ChatRole::Assistant => "model",
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate_json(&self, prompt: &str, schema: &serde_json::Value) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content::text(Some("user"), prompt)],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json"),
                response_schema: Some(schema),
                ..Default::default()
            }),
        };
        self.send(&request).await
    }

    async fn chat(&self, system: &str, history: &[ChatTurn], message: &str) -> Result<String> {
        // The conversation must open with a user turn
        let mut contents: Vec<Content> = history
            .iter()
            .skip_while(|turn| turn.role == ChatRole::Assistant)
            .map(|turn| Content::text(Some(role_name(turn.role)), &turn.text))
            .collect();
        contents.push(Content::text(Some("user"), message));

        let request = GenerateRequest {
            contents,
            system_instruction: Some(Content::text(None, system)),
            generation_config: None,
        };
        self.send(&request).await
    }

    async fn complete(
        &self,
        prompt: &str,
        max_output_tokens: u32,
        temperature: f32,
    ) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content::text(Some("user"), prompt)],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                max_output_tokens: Some(max_output_tokens),
                temperature: Some(temperature),
                ..Default::default()
            }),
        };
        self.send(&request).await
    }
}
