//! Chat-completion client for the Q&A panel.
//!
//! One prompt in, one answer out: a fixed system instruction is prepended and
//! the first choice's content is returned. No conversation history, no retry.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::{config::Config, provider::ServiceId};

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("No API key configured for service 'openai'")]
    MissingApiKey,

    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Chat request timed out")]
    Timeout,

    #[error("Failed to reach chat service: {0}")]
    Network(String),

    #[error("Chat request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse chat response: {0}")]
    Parse(String),

    #[error("Chat response contained no answer")]
    EmptyAnswer,
}

/// Chat endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// OpenAI-compatible API root (default: <https://api.openai.com/v1>)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Instruction sent ahead of every prompt.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

const fn default_max_tokens() -> u32 {
    500
}

fn default_system_prompt() -> String {
    "HTML 태그를 제외한 내용을 한글로 적어주세요".to_string()
}

const fn default_timeout() -> u64 {
    60
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            system_prompt: default_system_prompt(),
            timeout_secs: default_timeout(),
        }
    }
}

#[async_trait]
pub trait ChatBackend: Send + Sync + std::fmt::Debug {
    async fn ask(&self, prompt: &str) -> Result<String, ChatError>;
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Clone)]
pub struct ChatClient {
    api_key: String,
    config: ChatConfig,
    http: Client,
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .finish_non_exhaustive()
    }
}

impl ChatClient {
    pub fn new(api_key: String, config: ChatConfig) -> Result<Self, ChatError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ChatError::Client(e.to_string()))?;

        Ok(Self { api_key, config, http })
    }

    pub fn from_config(config: &Config) -> Result<Self, ChatError> {
        let api_key = config.resolve_api_key(ServiceId::OpenAi).ok_or(ChatError::MissingApiKey)?;
        Self::new(api_key, config.chat.clone())
    }
}

#[async_trait]
impl ChatBackend for ChatClient {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len(), model = %self.config.model))]
    async fn ask(&self, prompt: &str) -> Result<String, ChatError> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let request = CompletionRequest {
            model: &self.config.model,
            messages: [
                Message { role: "system", content: &self.config.system_prompt },
                Message { role: "user", content: prompt },
            ],
            max_tokens: self.config.max_tokens,
        };

        let res = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChatError::Timeout
                } else {
                    ChatError::Network(e.to_string())
                }
            })?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(ChatError::Status { status: status.as_u16(), body });
        }

        let parsed: CompletionResponse = res.json().await.map_err(|e| {
            if e.is_timeout() {
                ChatError::Timeout
            } else {
                ChatError::Parse(e.to_string())
            }
        })?;
        debug!(choices = parsed.choices.len(), "chat completion received");

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ChatError::EmptyAnswer)
    }
}
