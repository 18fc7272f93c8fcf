/*
* Completion client adapter
* -------------------------
* Thin, stateless adapter around the external chat-completion service
* (Azure OpenAI style deployment endpoint). The client is constructed
* explicitly from settings and injected into whoever needs it; there is no
* process-wide singleton. Reachability is purely a configuration question:
* endpoint + api key + deployment present means reachable.
*
* Known gap, on purpose: no timeout, no retry, no circuit breaker. One
* blocking round trip per call.
*/

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error};

use crate::config::LlmSettings;
use crate::errors::CompletionError;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Builds the standard system message used by every analysis call.
pub fn system_message(role: &str, expertise: &str, output_format: &str) -> ChatMessage {
    ChatMessage {
        role: ChatRole::System,
        content: format!(
            "You are a {role} specialized in {expertise}.\n\
             Respond precisely and professionally.\n\
             Expected output format: {output_format}.\n\
             If the format is JSON, return ONLY valid JSON, no extra text."
        ),
    }
}

pub fn user_message(content: impl Into<String>) -> ChatMessage {
    ChatMessage {
        role: ChatRole::User,
        content: content.into(),
    }
}

/// Seam to the external completion service, so tests can substitute a
/// scripted implementation.
#[async_trait]
pub trait Completions: Send + Sync {
    fn is_reachable(&self) -> bool;

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError>;
}

pub struct CompletionClient {
    http: reqwest::Client,
    settings: LlmSettings,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl CompletionClient {
    pub fn new(settings: LlmSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }

    fn completion_url(&self) -> Option<String> {
        let endpoint = self.settings.endpoint.as_deref()?.trim_end_matches('/');
        let deployment = self.settings.deployment.as_deref()?;
        Some(format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            endpoint,
            deployment,
            self.settings.api_version()
        ))
    }
}

#[async_trait]
impl Completions for CompletionClient {
    fn is_reachable(&self) -> bool {
        self.settings.is_configured()
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
        if !self.is_reachable() {
            debug!("Completion service not configured, skipping call");
            return Err(CompletionError::NotConfigured);
        }

        // is_reachable already guarantees the pieces are present.
        let url = self.completion_url().ok_or(CompletionError::NotConfigured)?;
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or(CompletionError::NotConfigured)?;

        let response = self
            .http
            .post(&url)
            .header("api-key", api_key)
            .json(&json!({ "messages": messages }))
            .send()
            .await?
            .error_for_status()
            .map_err(|e| {
                error!("Completion call failed: {}", e);
                CompletionError::from(e)
            })?;

        let body: ChatCompletionResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(CompletionError::EmptyResponse)?;

        Ok(content)
    }
}
